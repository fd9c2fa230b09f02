use super::signer::{RequestSigner, SigningError, SIGNATURE_PREFIX};
use super::{Transport, TransportError};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderValue, AUTHORIZATION, DATE, USER_AGENT};
use reqwest::{Request, Response};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Service name used in the SigV4 credential scope for Neptune IAM auth.
pub const DEFAULT_SERVICE_NAME: &str = "neptune-db";

static CLIENT_USER_AGENT: Lazy<String> = Lazy::new(|| {
    format!(
        "neptune-api-client ({} {}; Rust {})",
        env::consts::OS,
        env::consts::ARCH,
        rustc_version(env!("NEPTUNE_CLIENT_RUSTC_VERSION"))
    )
});

/// The `User-Agent` sent with every request, computed once per process.
pub fn user_agent() -> &'static str {
    &CLIENT_USER_AGENT
}

// "rustc 1.78.0 (9b00956e5 2024-04-29)" -> "1.78.0"
fn rustc_version(raw: &str) -> String {
    Regex::new(r"rustc (\d+\.\d+\.\S+)")
        .ok()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Build the `reqwest` client used when no transport is supplied.
///
/// Pool sizing is env-overridable; no request timeout is applied unless
/// `NEPTUNE_HTTP_TIMEOUT_SECS` is set.
pub fn default_http_client() -> std::result::Result<reqwest::Client, TransportError> {
    let settings = PoolSettings::from_lookup(|key| env::var(key).ok());
    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(settings.max_idle_per_host)
        .pool_idle_timeout(Some(settings.idle_timeout));

    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(TransportError::Http)
}

#[derive(Debug, PartialEq, Eq)]
struct PoolSettings {
    max_idle_per_host: usize,
    idle_timeout: Duration,
    timeout: Option<Duration>,
}

impl PoolSettings {
    // Unparseable values fall back to the defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        Self {
            max_idle_per_host: lookup("NEPTUNE_HTTP_POOL_MAX_IDLE_PER_HOST")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(32),
            idle_timeout: Duration::from_secs(
                parse("NEPTUNE_HTTP_POOL_IDLE_TIMEOUT_SECS").unwrap_or(90),
            ),
            timeout: parse("NEPTUNE_HTTP_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Configuration of the transport client.
#[derive(Clone)]
pub struct TransportConfig {
    /// Endpoint of the Neptune cluster; its scheme, host, port and path prefix
    /// replace those of every outgoing request.
    pub url: Url,

    /// AWS region of the cluster. Required when `signer` is set.
    pub region: Option<String>,

    /// Signs every request when set; requests go out unsigned otherwise.
    pub signer: Option<Arc<dyn RequestSigner>>,

    /// Executes the request. [`default_http_client`] is used when unset.
    pub transport: Option<Arc<dyn Transport>>,

    /// Credential-scope service name. Defaults to [`DEFAULT_SERVICE_NAME`].
    pub service_name: Option<String>,
}

impl TransportConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            region: None,
            signer: None,
            transport: None,
            service_name: None,
        }
    }
}

struct Signing {
    signer: Arc<dyn RequestSigner>,
    region: String,
    service: String,
}

/// Transport client: points requests at the configured endpoint, tags them
/// with the client's user agent, signs them, and hands them to the
/// underlying transport.
pub struct HttpTransport {
    url: Url,
    signing: Option<Signing>,
    inner: Arc<dyn Transport>,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let signing = match config.signer {
            Some(signer) => {
                let region = config.region.filter(|r| !r.is_empty()).ok_or_else(|| {
                    Error::configuration_with_context(
                        "region is required when a signer is configured",
                        ErrorContext::new()
                            .with_field_path("region")
                            .with_source("http_transport"),
                    )
                })?;
                Some(Signing {
                    signer,
                    region,
                    service: config
                        .service_name
                        .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
                })
            }
            None => None,
        };

        let inner: Arc<dyn Transport> = match config.transport {
            Some(transport) => transport,
            None => Arc::new(default_http_client()?),
        };

        Ok(Self {
            url: config.url,
            signing,
            inner,
        })
    }

    /// The endpoint requests are rewritten to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_signing(&self) -> bool {
        self.signing.is_some()
    }

    fn set_user_agent(&self, request: &mut Request) {
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_static(user_agent()));
    }

    fn set_url(&self, request: &mut Request) -> std::result::Result<(), TransportError> {
        let base = &self.url;
        let url = request.url_mut();

        url.set_scheme(base.scheme()).map_err(|_| {
            TransportError::Other(format!("cannot switch request scheme to {}", base.scheme()))
        })?;
        url.set_host(base.host_str())
            .map_err(|e| TransportError::Other(format!("invalid endpoint host: {}", e)))?;
        url.set_port(base.port())
            .map_err(|_| TransportError::Other("endpoint port cannot be applied".to_string()))?;

        // Plain concatenation; only the base's trailing slash is dropped.
        let prefix = base.path().trim_end_matches('/');
        if !prefix.is_empty() {
            let path = format!("{}{}", prefix, url.path());
            url.set_path(&path);
        }
        Ok(())
    }

    /// Returns whether a signature was added.
    fn sign(&self, signing: &Signing, request: &mut Request) -> std::result::Result<bool, TransportError> {
        if let Some(auth) = request.headers().get(AUTHORIZATION) {
            if auth.as_bytes().starts_with(SIGNATURE_PREFIX.as_bytes()) {
                return Ok(false);
            }
        }

        let now = Utc::now();
        let date = HeaderValue::from_str(&now.to_rfc3339_opts(SecondsFormat::Secs, true)).map_err(|e| {
            SigningError::InvalidHeader {
                name: "date",
                reason: e.to_string(),
            }
        })?;
        request.headers_mut().insert(DATE, date);

        let body = buffered_body(request)?;
        signing.signer.sign(
            request,
            body.as_deref(),
            &signing.service,
            &signing.region,
            now,
        )?;
        Ok(true)
    }
}

/// Copy the request payload for the signer, leaving the request's body in place.
fn buffered_body(request: &Request) -> std::result::Result<Option<Bytes>, SigningError> {
    match request.body() {
        None => Ok(None),
        Some(body) => match body.as_bytes() {
            Some([]) => Ok(None),
            Some(bytes) => Ok(Some(Bytes::copy_from_slice(bytes))),
            None => Err(SigningError::UnbufferedBody),
        },
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, mut request: Request) -> std::result::Result<Response, TransportError> {
        self.set_user_agent(&mut request);
        self.set_url(&mut request)?;
        let signed = match &self.signing {
            Some(signing) => self.sign(signing, &mut request)?,
            None => false,
        };

        debug!(
            method = %request.method(),
            url = %request.url(),
            signed,
            "dispatching neptune request"
        );
        self.inner.perform(request).await
    }
}
