use crate::client::core::{ClientConfig, NeptuneClient};
use crate::transport::{Credentials, RequestSigner, SigV4Signer, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

/// Builder for creating clients with custom configuration.
///
/// Environment defaults (see [`NeptuneClientBuilder::from_env`]):
/// - `NEPTUNE_ENDPOINT`: cluster address
/// - `AWS_REGION`, falling back to `AWS_DEFAULT_REGION`
pub struct NeptuneClientBuilder {
    address: Option<String>,
    region: Option<String>,
    signer: Option<Arc<dyn RequestSigner>>,
    transport: Option<Arc<dyn Transport>>,
    service_name: Option<String>,
}

impl NeptuneClientBuilder {
    pub fn new() -> Self {
        Self {
            address: None,
            region: None,
            signer: None,
            transport: None,
            service_name: None,
        }
    }

    /// Start from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            address: non_empty("NEPTUNE_ENDPOINT"),
            region: non_empty("AWS_REGION").or_else(|| non_empty("AWS_DEFAULT_REGION")),
            ..Self::new()
        }
    }

    /// Cluster endpoint address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sign requests with a custom signer.
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Sign requests with AWS SigV4 using `credentials`.
    pub fn sigv4(self, credentials: Credentials) -> Self {
        self.signer(Arc::new(SigV4Signer::new(credentials)))
    }

    /// Sign requests with AWS SigV4 using credentials from the environment.
    ///
    /// Fails when `AWS_ACCESS_KEY_ID` or `AWS_SECRET_ACCESS_KEY` is missing.
    pub fn with_env_credentials(self) -> Result<Self> {
        let credentials = Credentials::from_env().ok_or_else(|| {
            Error::configuration_with_context(
                "AWS credentials not found in environment",
                ErrorContext::new()
                    .with_field_path("AWS_ACCESS_KEY_ID")
                    .with_source("client_builder"),
            )
        })?;
        Ok(self.sigv4(credentials))
    }

    /// Replace the underlying request executor (mocks, custom `reqwest` clients).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the SigV4 service name (default `neptune-db`).
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<NeptuneClient> {
        let address = self.address.ok_or_else(|| {
            Error::configuration_with_context(
                "address must be specified (NEPTUNE_ENDPOINT)",
                ErrorContext::new()
                    .with_field_path("address")
                    .with_source("client_builder"),
            )
        })?;

        NeptuneClient::new(ClientConfig {
            address,
            region: self.region,
            signer: self.signer,
            transport: self.transport,
            service_name: self.service_name,
        })
    }
}

impl Default for NeptuneClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
