use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use obsq_core::AppResult;

/// Routing target alerts are delivered to unless configured otherwise.
pub const DEFAULT_ALERT_DESTINATION: &str = "openchoreo_alerts";

/// Threshold condition of a backend alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCondition {
    /// Column produced by the alert query.
    pub column: String,
    /// SQL comparison symbol.
    pub operator: String,
    /// Threshold value.
    pub value: f64,
}

/// Alert configuration as the backend's alert API accepts it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertConfigDocument {
    /// Rule name.
    pub name: String,
    /// Stream the query runs against.
    pub stream_name: String,
    /// Count query.
    pub query: String,
    /// Threshold condition on the count.
    pub condition: AlertCondition,
    /// Evaluation window.
    pub duration: String,
    /// Evaluation interval.
    pub frequency: String,
    /// Realtime flag; scheduled alerts always send `no`.
    pub is_realtime: String,
    /// Notification destinations.
    pub destinations: Vec<String>,
    /// Alert type.
    pub alert_type: String,
}

/// Alert entry from the backend's alert listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSummary {
    /// Backend-assigned identifier.
    pub alert_id: String,
    /// Rule name.
    pub name: String,
}

/// What a sync call did to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSyncAction {
    /// A new backend alert was created.
    Created,
    /// An existing backend alert was replaced.
    Updated,
    /// The backend alert was removed.
    Deleted,
}

/// Sync state reported after an alert call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSyncStatus {
    /// Backend reflects the requested state.
    Synced,
}

/// Outcome of one alert lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSyncResult {
    /// Action performed.
    pub action: AlertSyncAction,
    /// Sync status.
    pub status: AlertSyncStatus,
    /// Rule name.
    pub rule_logical_id: String,
    /// Backend identifier; empty when the backend did not echo one.
    pub rule_backend_id: String,
    /// When the call completed.
    pub last_synced_at: DateTime<Utc>,
}

/// Port for the backend's alert management API.
#[async_trait]
pub trait AlertBackend: Send + Sync {
    /// Creates an alert and returns its backend identifier when echoed.
    async fn create_alert(&self, document: &AlertConfigDocument) -> AppResult<Option<String>>;

    /// Lists every alert known to the backend.
    async fn list_alerts(&self) -> AppResult<Vec<AlertSummary>>;

    /// Deletes an alert by backend identifier.
    async fn delete_alert(&self, alert_id: &str) -> AppResult<()>;
}
