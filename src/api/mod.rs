//! Neptune bulk loader operations.
//!
//! Each operation is a small handler bound to a [`Transport`]: it builds a
//! request relative to the endpoint root, lets the transport address and sign
//! it, and decodes either the typed output or an [`ApiError`].
//!
//! | Handler | Method | Path |
//! |---------|--------|------|
//! | [`CreateLoader`] | `POST` | `/loader` |
//! | [`GetLoader`] | `GET` | `/loader?loadId=…` |
//! | [`CancelLoader`] | `DELETE` | `/loader?loadId=…` |

mod cancel_loader;
mod create_loader;
mod error;
mod get_loader;

pub use cancel_loader::{CancelLoader, CancelLoaderInput};
pub use create_loader::{
    CreateLoader, CreateLoaderInput, CreateLoaderOutput, CreateLoaderPayload, Format, Mode,
    Parallelism, ParserConfiguration,
};
pub use error::ApiError;
pub use get_loader::{
    ErrorLogEntry, FeedStatus, GetLoader, GetLoaderInput, GetLoaderOutput, GetLoaderPayload,
    LoadErrors,
};

use crate::transport::{Transport, TransportError};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub(crate) const LOADER_PATH: &str = "/loader";

// Requests are built against this origin; the transport swaps in the real endpoint.
const RELATIVE_ORIGIN: &str = "http://localhost";

pub(crate) fn new_request(method: Method, path: &str, source: &str) -> Result<Request> {
    let url = Url::parse(&format!("{}{}", RELATIVE_ORIGIN, path)).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid request path: {}", e),
            ErrorContext::new().with_field_path(path).with_source(source),
        )
    })?;
    Ok(Request::new(method, url))
}

/// Replace the request query with `pairs`.
///
/// Spaces go out as `%20` rather than `+`, so the wire query equals its SigV4
/// canonical form.
pub(crate) fn set_query(request: &mut Request, pairs: &[(&str, String)]) {
    if pairs.is_empty() {
        return;
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
        .replace('+', "%20");
    request.url_mut().set_query(Some(&encoded));
}

/// Send `request` and drain the response body.
pub(crate) async fn execute(
    transport: &dyn Transport,
    request: Request,
    operation: &'static str,
) -> Result<(StatusCode, Bytes)> {
    let response: Response = transport.perform(request).await?;
    let status = response.status();
    let body = response.bytes().await.map_err(TransportError::Http)?;
    debug!(
        operation,
        status = status.as_u16(),
        body_len = body.len(),
        "neptune response received"
    );
    Ok((status, body))
}

pub(crate) fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    operation: &'static str,
) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        Error::decode_with_context(
            e,
            ErrorContext::new()
                .with_details(format!("HTTP {}", status.as_u16()))
                .with_source(operation),
        )
    })
}

/// Turn a failure response into [`Error::Api`], or a decoding error when the
/// body is not an error document.
pub(crate) fn decode_api_error(status: StatusCode, body: &[u8], operation: &'static str) -> Error {
    match decode::<ApiError>(status, body, operation) {
        Ok(api_error) => Error::Api(api_error.with_status_code(status.as_u16())),
        Err(e) => e,
    }
}

/// The loader API spells boolean parameters `TRUE` / `FALSE`.
pub(crate) mod flag {
    use serde::Serializer;

    pub fn as_str(value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(as_str(*v)),
            None => serializer.serialize_none(),
        }
    }
}
