use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::core::{AnyHasher, Md5Hasher, Sha256Hasher};
use crate::error::ParseAlgorithmError;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha256 => 32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// A fresh incremental hasher for this algorithm.
    pub fn hasher(&self) -> AnyHasher {
        match self {
            HashAlgorithm::Md5 => AnyHasher::Md5(Md5Hasher::new()),
            HashAlgorithm::Sha256 => AnyHasher::Sha256(Sha256Hasher::new()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for HashAlgorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

/// How a [`UrlDigester`](crate::UrlDigester) hashes and retries.
///
/// # Examples
///
/// ```
/// use digestline_fetch::{DigestOptions, HashAlgorithm};
/// use std::time::Duration;
///
/// let options = DigestOptions::default()
///     .algorithm(HashAlgorithm::Sha256)
///     .max_retries(3)
///     .retry_backoff(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestOptions {
    /// Default: MD5
    pub algorithm: HashAlgorithm,

    /// Retries after the initial attempt for network failures.
    ///
    /// Total attempts = 1 + max_retries.
    ///
    /// Default: 0
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries.
    ///
    /// Default: 100ms
    pub retry_backoff: Duration,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            max_retries: 0,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

impl DigestOptions {
    #[must_use]
    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }
}

/// Settings for the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Default: None (no limit)
    pub connect_timeout: Option<Duration>,

    /// Limit for the whole request, body included.
    ///
    /// Default: None (no limit)
    pub request_timeout: Option<Duration>,

    /// Treat a non-2xx status as a failure instead of hashing the error page.
    ///
    /// Default: false
    pub require_success: bool,

    /// Honour `HTTP_PROXY`, `HTTPS_PROXY` and `NO_PROXY` from the environment.
    ///
    /// Default: true
    pub use_system_proxy: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            request_timeout: None,
            require_success: false,
            use_system_proxy: true,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn require_success(mut self, require_success: bool) -> Self {
        self.require_success = require_success;
        self
    }

    #[must_use]
    pub fn use_system_proxy(mut self, use_system_proxy: bool) -> Self {
        self.use_system_proxy = use_system_proxy;
        self
    }
}
