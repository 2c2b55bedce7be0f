use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream of response body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// The minimal interface needed to digest a URL. Implementations handle their
/// own redirects, timeouts and status policy.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync + 'static {
    type Error: std::error::Error + Send + 'static;

    /// Issue a GET for `url` and return the response body as a stream.
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::ClientOptions;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
        require_success: bool,
    }

    impl ReqwestClient {
        pub fn new(options: &ClientOptions) -> Result<Self, reqwest::Error> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = options.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(timeout) = options.request_timeout {
                builder = builder.timeout(timeout);
            }
            if !options.use_system_proxy {
                builder = builder.no_proxy();
            }

            Ok(Self {
                client: builder.build()?,
                require_success: options.require_success,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(&self, url: &str) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
            let mut response = self.client.get(url).send().await?;
            if self.require_success {
                response = response.error_for_status()?;
            }
            Ok(Box::pin(response.bytes_stream()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
