use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, error};
use url::Url;

use obsq_application::{
    AlertBackend, AlertConfigDocument, AlertSummary, CompiledQuery, SearchBackend, SearchResponse,
    StreamType,
};
use obsq_core::{AppError, AppResult};

use crate::OpenObserveConfig;

mod wire;


use wire::{AlertListResponse, CreateAlertResponse, SearchEnvelope, SearchRequestBody};

/// HTTP adapter for the OpenObserve search and alert APIs.
///
/// Holds only immutable configuration and a pooled client, so one instance
/// can serve concurrent callers. No call is retried.
#[derive(Clone)]
pub struct OpenObserveClient {
    http_client: reqwest::Client,
    base_url: Url,
    organization: String,
    username: String,
    token: String,
}

impl OpenObserveClient {
    /// Creates a client from validated configuration.
    pub fn new(config: OpenObserveConfig) -> AppResult<Self> {
        let organization = config.organization.trim();
        if organization.is_empty() {
            return Err(AppError::Validation(
                "openobserve organization must not be empty".to_owned(),
            ));
        }

        let base_url = Url::parse(config.base_url.trim()).map_err(|error| {
            AppError::Validation(format!(
                "invalid openobserve base url '{}': {error}",
                config.base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "openobserve base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build openobserve http client: {error}"))
            })?;

        Ok(Self {
            http_client,
            base_url,
            organization: organization.to_owned(),
            username: config.username,
            token: config.token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                AppError::Internal("openobserve base url cannot carry a path".to_owned())
            })?;
            path.pop_if_empty().extend(segments);
        }

        Ok(url)
    }

    fn search_url(&self, stream_type: StreamType) -> AppResult<Url> {
        let mut url = self.endpoint(&["api", self.organization.as_str(), "_search"])?;
        if stream_type == StreamType::Traces {
            url.set_query(Some("type=traces"));
        }

        Ok(url)
    }

    fn alerts_url(&self) -> AppResult<Url> {
        self.endpoint(&["api", "v2", self.organization.as_str(), "alerts"])
    }

    fn alert_url(&self, alert_id: &str) -> AppResult<Url> {
        self.endpoint(&["api", "v2", self.organization.as_str(), "alerts", alert_id])
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> AppResult<reqwest::Response> {
        request
            .basic_auth(self.username.as_str(), Some(self.token.as_str()))
            .send()
            .await
            .map_err(|error| {
                AppError::Backend(format!("openobserve {operation} request failed: {error}"))
            })
    }
}

/// Rejects statuses outside `accepted`, logging the body for operators only.
async fn ensure_status(
    response: reqwest::Response,
    accepted: &[StatusCode],
    operation: &'static str,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    error!(
        operation,
        status = status.as_u16(),
        body = %body,
        "openobserve returned an error status"
    );

    Err(AppError::BackendStatus(status.as_u16()))
}

async fn read_body(response: reqwest::Response, operation: &'static str) -> AppResult<Vec<u8>> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|error| {
            AppError::Backend(format!(
                "failed to read openobserve {operation} response: {error}"
            ))
        })
}

fn into_hit(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl SearchBackend for OpenObserveClient {
    async fn search(&self, query: &CompiledQuery) -> AppResult<SearchResponse> {
        let url = self.search_url(query.stream_type)?;
        let body = SearchRequestBody::from(query);

        let response = self
            .send(self.http_client.post(url).json(&body), "search")
            .await?;
        let response = ensure_status(response, &[StatusCode::OK], "search").await?;
        let bytes = read_body(response, "search").await?;

        let envelope: SearchEnvelope = serde_json::from_slice(&bytes).map_err(|error| {
            AppError::Backend(format!("failed to decode openobserve search response: {error}"))
        })?;

        debug!(
            stream_type = query.stream_type.as_str(),
            hits = envelope.hits.len(),
            total = envelope.total,
            took_ms = envelope.took,
            "openobserve search completed"
        );

        Ok(SearchResponse {
            took: envelope.took,
            total: envelope.total,
            hits: envelope.hits.into_iter().map(into_hit).collect(),
        })
    }
}

#[async_trait]
impl AlertBackend for OpenObserveClient {
    async fn create_alert(&self, document: &AlertConfigDocument) -> AppResult<Option<String>> {
        let url = self.alerts_url()?;

        let response = self
            .send(self.http_client.post(url).json(document), "create alert")
            .await?;
        let response = ensure_status(
            response,
            &[StatusCode::OK, StatusCode::CREATED],
            "create alert",
        )
        .await?;
        let bytes = read_body(response, "create alert").await?;

        // The backend does not always echo the new identifier.
        Ok(serde_json::from_slice::<CreateAlertResponse>(&bytes)
            .ok()
            .and_then(|created| created.alert_id)
            .filter(|alert_id| !alert_id.is_empty()))
    }

    async fn list_alerts(&self) -> AppResult<Vec<AlertSummary>> {
        let url = self.alerts_url()?;

        let response = self
            .send(self.http_client.get(url), "list alerts")
            .await?;
        let response = ensure_status(response, &[StatusCode::OK], "list alerts").await?;
        let bytes = read_body(response, "list alerts").await?;

        let listing: AlertListResponse = serde_json::from_slice(&bytes).map_err(|error| {
            AppError::Backend(format!("failed to decode openobserve alert list: {error}"))
        })?;

        Ok(listing
            .list
            .into_iter()
            .map(|item| AlertSummary {
                alert_id: item.alert_id,
                name: item.name,
            })
            .collect())
    }

    async fn delete_alert(&self, alert_id: &str) -> AppResult<()> {
        let url = self.alert_url(alert_id)?;

        let response = self
            .send(self.http_client.delete(url), "delete alert")
            .await?;
        ensure_status(
            response,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
            "delete alert",
        )
        .await?;

        Ok(())
    }
}
