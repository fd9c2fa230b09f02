//! Recording transport double for unit tests.

use super::{Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response};
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Captures every request and answers each with the same canned response.
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<CapturedRequest>>,
    status: u16,
    body: String,
}

impl RecordingTransport {
    pub fn respond(status: u16, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            status,
            body: body.into(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<CapturedRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn perform(&self, request: Request) -> Result<Response, TransportError> {
        let captured = CapturedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| b.to_vec()),
        };
        self.calls.lock().unwrap().push(captured);

        let response = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Response::from(response))
    }
}
