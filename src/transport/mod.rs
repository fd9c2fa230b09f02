//! Request dispatch: the pluggable network capability, request signing, and the
//! transport client that binds both to a configured Neptune endpoint.

mod http;
mod signer;

#[cfg(test)]
pub(crate) mod testing;

pub use http::{default_http_client, user_agent, HttpTransport, TransportConfig, DEFAULT_SERVICE_NAME};
pub use signer::{Credentials, RequestSigner, SigV4Signer, SigningError, SIGNATURE_PREFIX};

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a single HTTP exchange.
///
/// Implementations must not inspect the response status; decoding belongs to
/// the operation that issued the request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: Request) -> Result<Response, TransportError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn perform(&self, request: Request) -> Result<Response, TransportError> {
        self.execute(request).await.map_err(TransportError::Http)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("Transport error: {0}")]
    Other(String),
}
