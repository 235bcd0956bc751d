//! Built-in configuration tables.
//!
//! Process-wide read-only constants: platform targets, third-party
//! dependency coordinates with their repository hooks, and the product
//! publication metadata block. Populated on first use, never mutated;
//! consumers receive references or clones of immutable values.

use std::path::PathBuf;
use std::sync::LazyLock;

use url::Url;

use crate::conventions::publish::{
    Developer, License, Organization, ProjectMetadata, SourceControl,
};
use crate::core::repository::Repository;
use crate::core::{Dependency, Target};

fn repo_url(raw: &str) -> Url {
    // Catalog URLs are literals; a parse failure is a programming error.
    Url::parse(raw).expect("catalog repository url")
}

/// The default remote repository.
pub static MAVEN_CENTRAL: LazyLock<Repository> = LazyLock::new(|| {
    Repository::maven("central", repo_url("https://repo.maven.apache.org/maven2/"))
});

/// The developer's local artifact cache.
pub static MAVEN_LOCAL: LazyLock<Repository> = LazyLock::new(|| {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"));
    let url = Url::from_file_path(home.join(".m2").join("repository"))
        .unwrap_or_else(|_| repo_url("file:///"));
    Repository::maven("local", url)
});

/// Compile-time nullability annotations, added by the toolchain convention.
pub static ANNOTATIONS: LazyLock<Dependency> =
    LazyLock::new(|| Dependency::new("org.jetbrains", "annotations", "24.0.1"));

// The Lamp command framework: every artifact lives behind a filtered
// jitpack repository.
const LAMP_GROUP: &str = "com.github.Revxrsal.Lamp";

/// The version of Lamp to use.
pub const LAMP_VERSION: &str = "3.1.7";

fn lamp_repository() -> Repository {
    Repository::maven("jitpack-lamp", repo_url("https://jitpack.io")).include_group(LAMP_GROUP)
}

fn lamp(artifact: &str) -> Dependency {
    Dependency::new(LAMP_GROUP, artifact, LAMP_VERSION).with_repository(lamp_repository())
}

/// The Lamp `common` dependency.
pub static LAMP_COMMON: LazyLock<Dependency> = LazyLock::new(|| lamp("common"));

/// The Lamp `bukkit` dependency.
pub static LAMP_BUKKIT: LazyLock<Dependency> = LazyLock::new(|| lamp("bukkit"));

/// The Vault API, compiled against but never bundled.
pub static VAULT_API: LazyLock<Dependency> = LazyLock::new(|| {
    Dependency::new("com.github.MilkBowl", "VaultAPI", "1.7.1").with_repository(
        Repository::maven("jitpack-deps", repo_url("https://jitpack.io"))
            .include_module("com.github.MilkBowl", "VaultAPI"),
    )
});

/// The Bukkit platform target.
pub static BUKKIT: LazyLock<Target> = LazyLock::new(|| {
    Target::new(
        "Bukkit",
        Dependency::new("org.spigotmc", "spigot-api", "1.20.2-R0.1-SNAPSHOT").with_repository(
            Repository::maven(
                "spigotmc",
                repo_url("https://hub.spigotmc.org/nexus/content/repositories/snapshots/"),
            ),
        ),
    )
});

/// All built-in targets.
pub fn targets() -> Vec<&'static Target> {
    vec![&BUKKIT]
}

/// Look up a built-in target by name, case-insensitively.
pub fn target_by_name(name: &str) -> Option<&'static Target> {
    targets()
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name))
}

/// The fixed metadata block attached to every publication of the product.
pub fn project_metadata() -> ProjectMetadata {
    ProjectMetadata {
        license: License {
            name: "Apache License 2.0".to_string(),
            url: "https://opensource.org/licenses/Apache-2.0".to_string(),
            distribution: "repo".to_string(),
        },
        organization: Organization {
            name: "Sanctum".to_string(),
            url: "https://github.com/the-h-team".to_string(),
        },
        developers: vec![
            Developer {
                id: "ms5984".to_string(),
                name: "Matt".to_string(),
                url: "https://github.com/ms5984".to_string(),
            },
            Developer {
                id: "Hempfest".to_string(),
                name: "Austin".to_string(),
                url: "https://github.com/Hempfest".to_string(),
            },
        ],
        scm: SourceControl {
            connection: "scm:git:git://github.com/the-h-team/Enterprise.git".to_string(),
            developer_connection: "scm:git:ssh://github.com/the-h-team/Enterprise.git".to_string(),
            url: "https://github.com/the-h-team/Enterprise/tree/master".to_string(),
        },
    }
}
