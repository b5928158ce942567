use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use obsq_core::{AppError, AppResult, NonEmptyString};
use obsq_domain::AlertRule;

use crate::alert_ports::{AlertBackend, AlertSyncAction, AlertSyncResult, AlertSyncStatus};
use crate::alert_translator::{resolve_alert_id, to_alert_config};


/// Application service for the log alert rule lifecycle.
#[derive(Clone)]
pub struct AlertRuleService {
    backend: Arc<dyn AlertBackend>,
    stream_name: String,
    destination: String,
}

impl AlertRuleService {
    /// Creates a service writing alerts against the given log stream.
    #[must_use]
    pub fn new(
        backend: Arc<dyn AlertBackend>,
        stream_name: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            stream_name: stream_name.into(),
            destination: destination.into(),
        }
    }

    /// Creates a backend alert for the rule.
    pub async fn create_rule(&self, rule: &AlertRule) -> AppResult<AlertSyncResult> {
        let document = to_alert_config(rule, &self.stream_name, &self.destination)?;
        let backend_id = self.backend.create_alert(&document).await?;

        info!(
            rule = %document.name,
            backend_id = backend_id.as_deref().unwrap_or_default(),
            "alert rule created"
        );

        Ok(synced(
            AlertSyncAction::Created,
            document.name,
            backend_id.unwrap_or_default(),
        ))
    }

    /// Deletes the backend alert carrying `name`.
    pub async fn delete_rule(&self, name: &str) -> AppResult<AlertSyncResult> {
        let name = NonEmptyString::for_field("name", name)?;
        let alert_id = self.resolve_id_by_name(name.as_str()).await?;
        self.backend.delete_alert(&alert_id).await?;

        info!(rule = %name.as_str(), backend_id = %alert_id, "alert rule deleted");

        Ok(synced(AlertSyncAction::Deleted, name.into(), alert_id))
    }

    /// Replaces the backend alert with the rule's name, or creates it when
    /// none exists yet.
    ///
    /// The backend has no update call, so this deletes then recreates. If
    /// the create fails after the delete succeeded, the rule is gone until
    /// the caller retries.
    pub async fn update_rule(&self, rule: &AlertRule) -> AppResult<AlertSyncResult> {
        let document = to_alert_config(rule, &self.stream_name, &self.destination)?;

        match self.resolve_id_by_name(document.name.as_str()).await {
            Ok(existing_id) => {
                self.backend.delete_alert(&existing_id).await?;
            }
            Err(AppError::NotFound(_)) => {
                info!(rule = %document.name, "alert rule missing, creating instead");
                return self.create_rule(rule).await;
            }
            Err(error) => return Err(error),
        }

        let backend_id = match self.backend.create_alert(&document).await {
            Ok(backend_id) => backend_id,
            Err(error) => {
                warn!(
                    rule = %document.name,
                    error = %error,
                    "alert rule deleted but recreate failed"
                );
                return Err(error);
            }
        };

        info!(rule = %document.name, "alert rule updated");

        Ok(synced(
            AlertSyncAction::Updated,
            document.name,
            backend_id.unwrap_or_default(),
        ))
    }

    /// Resolves a rule name to its backend alert identifier.
    pub async fn resolve_id_by_name(&self, name: &str) -> AppResult<String> {
        let alerts = self.backend.list_alerts().await?;
        resolve_alert_id(&alerts, name)
    }
}

fn synced(
    action: AlertSyncAction,
    rule_logical_id: String,
    rule_backend_id: String,
) -> AlertSyncResult {
    AlertSyncResult {
        action,
        status: AlertSyncStatus::Synced,
        rule_logical_id,
        rule_backend_id,
        last_synced_at: Utc::now(),
    }
}
