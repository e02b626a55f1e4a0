//! Network transfer capability
//!
//! The fetcher consumes the network through the `Transport` trait: given a
//! URL-shaped resource key, return the raw payload bytes or fail with a
//! transport error. The production implementation wraps `reqwest`; tests
//! substitute scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Errors that can occur while transferring a resource
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be completed (DNS, connect, timeout, protocol)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// A single GET-and-return-bytes capability
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the raw payload for a URL-shaped resource key
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// HTTP transport backed by a `reqwest::Client`
///
/// The client decodes gzip-compressed bodies transparently, so the payload
/// handed back is always the decompressed document.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the crate's user agent and the given timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a transport from a preconfigured HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
