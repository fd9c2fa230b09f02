use crate::api::{CancelLoader, CreateLoader, GetLoader};
use crate::transport::{HttpTransport, RequestSigner, Transport, TransportConfig};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use url::Url;

/// Connection settings for a Neptune cluster.
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Cluster endpoint, e.g. `https://my-cluster.cluster-xyz.us-east-1.neptune.amazonaws.com:8182`.
    pub address: String,

    /// AWS region. Required when `signer` is set.
    pub region: Option<String>,

    /// Signs requests with AWS SigV4 when set.
    pub signer: Option<Arc<dyn RequestSigner>>,

    /// Underlying request executor; a pooled `reqwest::Client` when unset.
    pub transport: Option<Arc<dyn Transport>>,

    /// SigV4 service name override.
    pub service_name: Option<String>,
}

/// Neptune bulk loader client.
///
/// Each loader operation is a handler field sharing one transport client:
///
/// ```rust,no_run
/// use neptune_api_client::{ClientConfig, CreateLoaderInput, Format, NeptuneClient};
///
/// # async fn run() -> neptune_api_client::Result<()> {
/// let client = NeptuneClient::new(ClientConfig {
///     address: "https://my-cluster:8182".to_string(),
///     ..Default::default()
/// })?;
///
/// let created = client
///     .create_loader
///     .call(&CreateLoaderInput::new("s3://bucket/graph/", Format::Csv))
///     .await?;
/// println!("started {:?}", created.load_id());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NeptuneClient {
    pub create_loader: CreateLoader,
    pub get_loader: GetLoader,
    pub cancel_loader: CancelLoader,
    transport: Arc<HttpTransport>,
}

impl NeptuneClient {
    /// Create a client from `config`.
    ///
    /// Fails when the address is not an absolute URL with a host, or when a
    /// signer is given without a region.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = parse_address(&config.address)?;

        let transport = Arc::new(HttpTransport::new(TransportConfig {
            url,
            region: config.region,
            signer: config.signer,
            transport: config.transport,
            service_name: config.service_name,
        })?);
        let shared: Arc<dyn Transport> = transport.clone();

        Ok(Self {
            create_loader: CreateLoader::new(shared.clone()),
            get_loader: GetLoader::new(shared.clone()),
            cancel_loader: CancelLoader::new(shared),
            transport,
        })
    }

    /// The transport client shared by all handlers.
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }
}

fn parse_address(address: &str) -> Result<Url> {
    let context = || {
        ErrorContext::new()
            .with_field_path("address")
            .with_source("neptune_client")
    };

    let url = Url::parse(address.trim_end_matches('/')).map_err(|e| {
        Error::configuration_with_context(format!("invalid address {:?}: {}", address, e), context())
    })?;
    if !url.has_host() {
        return Err(Error::configuration_with_context(
            format!("address {:?} has no host", address),
            context(),
        ));
    }
    Ok(url)
}
