//! Pure transformations: hashing and backoff.

mod hasher;
mod retry;

pub use hasher::{AnyHasher, DigestHasher, Hasher, Md5Hasher, Sha256Hasher};
pub use retry::retry_delay;
