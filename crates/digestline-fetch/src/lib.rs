//! Remote content digests.
//!
//! [`UrlDigester`] downloads a URL and streams the body through an incremental
//! [`Hasher`], so the content is never held in memory as a whole. It implements
//! [`digestline_pipeline::Processor`] and plugs straight into a pipeline.
//!
//! # Architecture
//!
//! - [`data`] - Hash algorithm selection and options
//! - [`core`] - Hashers and retry backoff
//! - [`effects`] - HTTP client abstraction and the digester itself

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{AnyHasher, DigestHasher, Hasher, Md5Hasher, Sha256Hasher, retry_delay};
pub use data::{ClientOptions, DigestOptions, HashAlgorithm};
pub use effects::{BoxStream, HttpClient, UrlDigester};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, ParseAlgorithmError};
