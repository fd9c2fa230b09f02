use super::{decode, decode_api_error, execute, flag, new_request, set_query, LOADER_PATH};
use crate::transport::Transport;
use crate::Result;
use reqwest::Method;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;

const OPERATION: &str = "get_loader";

/// Query for `GET /loader`. Only the parameters that are set are sent.
///
/// Without a `load_id` the service lists recent load ids instead of
/// describing one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetLoaderInput {
    pub load_id: Option<String>,
    /// Include per-feed details.
    pub details: Option<bool>,
    /// Include the error log.
    pub errors: Option<bool>,
    pub page: Option<u32>,
    pub errors_per_page: Option<u32>,
    /// Number of load ids to list when `load_id` is unset.
    pub limit: Option<u32>,
    pub include_queued_loads: Option<bool>,
}

impl GetLoaderInput {
    pub fn for_load(load_id: impl Into<String>) -> Self {
        Self {
            load_id: Some(load_id.into()),
            ..Default::default()
        }
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref load_id) = self.load_id {
            pairs.push(("loadId", load_id.clone()));
        }
        if let Some(details) = self.details {
            pairs.push(("details", flag::as_str(details).to_string()));
        }
        if let Some(errors) = self.errors {
            pairs.push(("errors", flag::as_str(errors).to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(errors_per_page) = self.errors_per_page {
            pairs.push(("errorsPerPage", errors_per_page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(include) = self.include_queued_loads {
            pairs.push(("includeQueuedLoads", flag::as_str(include).to_string()));
        }
        pairs
    }

    /// Fetch load status through `transport`.
    pub async fn send(&self, transport: &dyn Transport) -> Result<GetLoaderOutput> {
        let mut request = new_request(Method::GET, LOADER_PATH, OPERATION)?;
        set_query(&mut request, &self.query_pairs());

        let (status, body) = execute(transport, request, OPERATION).await?;
        if status.as_u16() >= 400 {
            return Err(decode_api_error(status, &body, OPERATION));
        }
        decode(status, &body, OPERATION)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLoaderOutput {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payload: Option<GetLoaderPayload>,
}

impl GetLoaderOutput {
    /// Status string of the job as a whole, e.g. `LOAD_IN_PROGRESS`.
    pub fn overall_status(&self) -> Option<&str> {
        self.payload
            .as_ref()?
            .overall_status
            .as_ref()?
            .status
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLoaderPayload {
    /// Feed counts keyed by status, one map per status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub feed_count: Vec<HashMap<String, i64>>,
    #[serde(default)]
    pub overall_status: Option<FeedStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_feeds: Vec<FeedStatus>,
    #[serde(default)]
    pub errors: Option<LoadErrors>,
    /// Present when listing loads, including queued ones when requested.
    #[serde(default, deserialize_with = "null_as_default")]
    pub load_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    #[serde(default)]
    pub full_uri: Option<String>,
    #[serde(default)]
    pub run_number: Option<i64>,
    #[serde(default)]
    pub retry_number: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub total_time_spent: Option<i64>,
    /// Epoch seconds.
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub total_records: Option<i64>,
    #[serde(default)]
    pub total_duplicates: Option<i64>,
    #[serde(default)]
    pub parsing_errors: Option<i64>,
    #[serde(default)]
    pub datatype_mismatch_errors: Option<i64>,
    #[serde(default)]
    pub insert_errors: Option<i64>,
}

/// One page of the load's error log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadErrors {
    #[serde(default)]
    pub start_index: Option<i64>,
    #[serde(default)]
    pub end_index: Option<i64>,
    #[serde(default)]
    pub load_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_logs: Vec<ErrorLogEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub record_num: Option<i64>,
}

// recordNum shows up both as a number and as a numeric string.
fn lenient_i64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// The service sends `null` for empty lists.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Handler for `GET /loader`.
#[derive(Clone)]
pub struct GetLoader {
    transport: Arc<dyn Transport>,
}

impl GetLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn call(&self, input: &GetLoaderInput) -> Result<GetLoaderOutput> {
        input.send(self.transport.as_ref()).await
    }
}
