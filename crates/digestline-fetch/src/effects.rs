//! I/O: the HTTP client abstraction and the digester.

mod digester;
mod http;

pub use digester::UrlDigester;
pub use http::{BoxStream, HttpClient};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
