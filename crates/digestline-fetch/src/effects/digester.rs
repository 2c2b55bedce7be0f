use futures_util::TryStreamExt;
use tracing::{debug, warn};

use digestline_pipeline::Processor;

use crate::core::{Hasher, retry_delay};
use crate::data::DigestOptions;
use crate::effects::HttpClient;
use crate::error::FetchError;

/// Downloads a URL and returns the hex digest of its body.
///
/// The body is hashed chunk by chunk as it arrives.
pub struct UrlDigester<C> {
    client: C,
    options: DigestOptions,
}

impl<C: HttpClient> UrlDigester<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: DigestOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DigestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DigestOptions { &self.options }

    pub fn client(&self) -> &C { &self.client }

    /// Digest the body at `url`, retrying network failures per [`DigestOptions`].
    ///
    /// A blank URL fails with [`FetchError::InvalidUrl`] without a request.
    pub async fn digest(&self, url: &str) -> Result<String, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let mut retry = 0;
        loop {
            let err = match self.digest_once(url).await {
                Ok(digest) => return Ok(digest),
                Err(e) => e,
            };

            if !err.is_transient() || retry >= self.options.max_retries {
                if retry == 0 {
                    return Err(err);
                }
                return Err(FetchError::MaxRetriesExceeded {
                    count: retry + 1,
                    last: Box::new(err),
                });
            }

            let delay = retry_delay(retry, self.options.retry_backoff);
            warn!(url, attempt = retry + 1, error = %err, ?delay, "retrying");
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }

    async fn digest_once(&self, url: &str) -> Result<String, FetchError> {
        let mut body = self.client.stream(url).await.map_err(Self::map_error)?;
        let mut hasher = self.options.algorithm.hasher();
        let mut bytes = 0u64;

        while let Some(chunk) = body.try_next().await.map_err(Self::map_error)? {
            hasher.update(&chunk);
            bytes += chunk.len() as u64;
        }

        debug!(url, bytes, algorithm = %self.options.algorithm, "body hashed");
        Ok(hex::encode(hasher.finalize()))
    }

    fn map_error<E: std::error::Error>(e: E) -> FetchError { FetchError::Network(e.to_string()) }
}

impl<C: HttpClient> Processor<String> for UrlDigester<C> {
    type Output = String;
    type Error = FetchError;

    async fn process(&self, url: String) -> Result<String, FetchError> { self.digest(&url).await }
}
