use super::{decode_api_error, execute, new_request, set_query, LOADER_PATH};
use crate::transport::Transport;
use crate::{Error, Result};
use reqwest::{Method, StatusCode};
use std::sync::Arc;

const OPERATION: &str = "cancel_loader";

/// Request for `DELETE /loader`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelLoaderInput {
    /// Required; checked before anything is sent.
    pub load_id: Option<String>,
}

impl CancelLoaderInput {
    pub fn new(load_id: impl Into<String>) -> Self {
        Self {
            load_id: Some(load_id.into()),
        }
    }

    /// Cancel the load job through `transport`.
    pub async fn send(&self, transport: &dyn Transport) -> Result<()> {
        let load_id = self
            .load_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("loadId", OPERATION))?;

        let mut request = new_request(Method::DELETE, LOADER_PATH, OPERATION)?;
        set_query(&mut request, &[("loadId", load_id.to_string())]);

        let (status, body) = execute(transport, request, OPERATION).await?;
        if status == StatusCode::OK {
            return Ok(());
        }
        Err(decode_api_error(status, &body, OPERATION))
    }
}

/// Handler for `DELETE /loader`.
#[derive(Clone)]
pub struct CancelLoader {
    transport: Arc<dyn Transport>,
}

impl CancelLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn call(&self, input: &CancelLoaderInput) -> Result<()> {
        input.send(self.transport.as_ref()).await
    }
}
