//! AWS Signature Version 4 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Request;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Prefix shared by every SigV4 `Authorization` header value.
pub const SIGNATURE_PREFIX: &str = "AWS4";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Adds authentication headers to an outgoing request.
///
/// `body` is a buffered copy of the request payload (`None` when the request
/// has no body); the request keeps its own body untouched.
pub trait RequestSigner: Send + Sync {
    fn sign(
        &self,
        request: &mut Request,
        body: Option<&[u8]>,
        service: &str,
        region: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), SigningError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("request URL has no host")]
    MissingHost,

    #[error("request body is a stream and cannot be buffered for signing")]
    UnbufferedBody,

    #[error("invalid header value for {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("HMAC key error: {0}")]
    Key(String),
}

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
    /// `AWS_SESSION_TOKEN` from the environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut credentials = Self::new(
            non_empty("AWS_ACCESS_KEY_ID")?,
            non_empty("AWS_SECRET_ACCESS_KEY")?,
        );
        credentials.session_token = non_empty("AWS_SESSION_TOKEN");
        Some(credentials)
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// SigV4 signer over static credentials.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Credentials,
}

impl SigV4Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Derive the signing key and sign `string_to_sign`.
    fn calculate_signature(
        &self,
        string_to_sign: &str,
        date_stamp: &str,
        region: &str,
        service: &str,
    ) -> Result<String, SigningError> {
        let k_date = hmac_sha256(
            format!("{}{}", SIGNATURE_PREFIX, self.credentials.secret_access_key).as_bytes(),
            date_stamp.as_bytes(),
        )?;
        let k_region = hmac_sha256(&k_date, region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, service.as_bytes())?;
        let k_signing = hmac_sha256(&k_service, b"aws4_request")?;

        let signature = hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
        Ok(hex::encode(signature))
    }
}

impl RequestSigner for SigV4Signer {
    fn sign(
        &self,
        request: &mut Request,
        body: Option<&[u8]>,
        service: &str,
        region: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), SigningError> {
        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = timestamp.format("%Y%m%d").to_string();

        let url = request.url();
        let host = url.host_str().ok_or(SigningError::MissingHost)?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        // BTreeMap keeps the canonical (lowercase, sorted) header order.
        let mut headers = BTreeMap::new();
        headers.insert("host", host);
        headers.insert("x-amz-date", amz_date.clone());
        if let Some(value) = request.headers().get(CONTENT_TYPE) {
            let value = value.to_str().map_err(|e| SigningError::InvalidHeader {
                name: "content-type",
                reason: e.to_string(),
            })?;
            headers.insert("content-type", value.trim().to_string());
        }
        if let Some(ref token) = self.credentials.session_token {
            headers.insert("x-amz-security-token", token.clone());
        }

        let canonical_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k, v))
            .collect();
        let signed_headers = headers.keys().copied().collect::<Vec<_>>().join(";");

        let payload_hash = hex::encode(Sha256::digest(body.unwrap_or_default()));
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method().as_str(),
            canonical_uri(url),
            canonical_query(url),
            canonical_headers,
            signed_headers,
            payload_hash
        );

        let credential_scope = format!("{}/{}/{}/aws4_request", date_stamp, region, service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = self.calculate_signature(&string_to_sign, &date_stamp, region, service)?;
        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.credentials.access_key_id, credential_scope, signed_headers, signature
        );

        let request_headers = request.headers_mut();
        request_headers.insert("x-amz-date", header_value("x-amz-date", &amz_date)?);
        if let Some(ref token) = self.credentials.session_token {
            request_headers.insert(
                "x-amz-security-token",
                header_value("x-amz-security-token", token)?,
            );
        }
        request_headers.insert(AUTHORIZATION, header_value("authorization", &authorization)?);

        Ok(())
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, SigningError> {
    HeaderValue::from_str(value).map_err(|e| SigningError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| SigningError::Key(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn canonical_uri(url: &url::Url) -> &str {
    match url.path() {
        "" => "/",
        path => path,
    }
}

// Decodes the wire query and re-encodes it per RFC 3986: `%20` for spaces.
fn canonical_query(url: &url::Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 encoding: everything but unreserved characters is percent-encoded.
fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
