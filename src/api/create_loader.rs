use super::{decode, decode_api_error, execute, flag, new_request, LOADER_PATH};
use crate::transport::Transport;
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const OPERATION: &str = "create_loader";

/// Data format of the files being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Gremlin CSV
    Csv,
    /// openCypher CSV
    Opencypher,
    Ntriples,
    Nquads,
    Rdfxml,
    Turtle,
}

/// How the loader treats a previous load from the same source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Resume,
    New,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Parallelism {
    Low,
    Medium,
    High,
    Oversubscribe,
}

/// Optional RDF parser settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_graph_uri: Option<String>,
}

/// Body of a load job request. Unset fields are left out of the JSON.
///
/// The service requires `source` and `format`; the client sends whatever it
/// is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoaderInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "flag::serialize")]
    pub fail_on_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<Parallelism>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_configuration: Option<ParserConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "flag::serialize")]
    pub update_single_cardinality_properties: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "flag::serialize")]
    pub queue_request: Option<bool>,
    /// Load ids that must complete before this job starts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl CreateLoaderInput {
    pub fn new(source: impl Into<String>, format: Format) -> Self {
        Self {
            source: Some(source.into()),
            format: Some(format),
            ..Default::default()
        }
    }

    pub fn iam_role_arn(mut self, arn: impl Into<String>) -> Self {
        self.iam_role_arn = Some(arn.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn fail_on_error(mut self, enable: bool) -> Self {
        self.fail_on_error = Some(enable);
        self
    }

    pub fn queue_request(mut self, enable: bool) -> Self {
        self.queue_request = Some(enable);
        self
    }

    pub fn depends_on(mut self, load_id: impl Into<String>) -> Self {
        self.dependencies.push(load_id.into());
        self
    }

    /// Submit the load job through `transport`.
    pub async fn send(&self, transport: &dyn Transport) -> Result<CreateLoaderOutput> {
        let body = serde_json::to_vec(self).map_err(|e| {
            Error::validation_with_context(
                format!("load job request could not be encoded: {}", e),
                ErrorContext::new().with_source(OPERATION),
            )
        })?;

        let mut request = new_request(Method::POST, LOADER_PATH, OPERATION)?;
        *request.body_mut() = Some(body.into());
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let (status, body) = execute(transport, request, OPERATION).await?;
        if status.as_u16() >= 400 {
            return Err(decode_api_error(status, &body, OPERATION));
        }
        decode(status, &body, OPERATION)
    }
}

/// Response to a successful load job submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoaderOutput {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payload: Option<CreateLoaderPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoaderPayload {
    #[serde(default)]
    pub load_id: Option<String>,
}

impl CreateLoaderOutput {
    /// Handle of the new load job.
    pub fn load_id(&self) -> Option<&str> {
        self.payload.as_ref()?.load_id.as_deref()
    }
}

/// Handler for `POST /loader`.
#[derive(Clone)]
pub struct CreateLoader {
    transport: Arc<dyn Transport>,
}

impl CreateLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn call(&self, input: &CreateLoaderInput) -> Result<CreateLoaderOutput> {
        input.send(self.transport.as_ref()).await
    }
}
