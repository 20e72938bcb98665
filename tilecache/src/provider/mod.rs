//! Network access for tile downloads.
//!
//! [`AsyncHttpClient`] is the seam between the fetcher and the network;
//! [`AsyncReqwestClient`] is the production implementation.

mod http;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpClientConfig, DEFAULT_USER_AGENT};
pub use types::FetchError;

#[cfg(test)]
pub(crate) use http::tests::MockAsyncHttpClient;
