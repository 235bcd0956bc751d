//! Shared utilities: error taxonomy and fingerprinting.

pub mod errors;
pub mod hash;

pub use errors::ConfigError;
