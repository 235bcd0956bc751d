//! Fingerprinting for reproducibility checks.
//!
//! Merge instructions must be byte-stable across repeated builds with
//! unchanged inputs. A fingerprint is a sha256 digest over an ordered list
//! of components, with separators so adjacent components cannot collide.

use sha2::{Digest, Sha256};

/// An ordered fingerprint over string components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Append one component. Component order is significant.
    pub fn push(&mut self, component: &str) -> &mut Self {
        self.hasher.update(component.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Finalize into a hex digest.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let mut a = Fingerprint::new();
        a.push("plugin-2.0.0.jar").push("com.example:lib:1.0");
        let mut b = Fingerprint::new();
        b.push("plugin-2.0.0.jar").push("com.example:lib:1.0");
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let mut a = Fingerprint::new();
        a.push("one").push("two");
        let mut b = Fingerprint::new();
        b.push("two").push("one");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_separator_prevents_component_merging() {
        let mut a = Fingerprint::new();
        a.push("ab").push("c");
        let mut b = Fingerprint::new();
        b.push("a").push("bc");
        assert_ne!(a.finish(), b.finish());
    }
}
