//! Immutable configuration.

mod options;

pub use options::{ClientOptions, DigestOptions, HashAlgorithm};
