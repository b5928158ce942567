use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use obsq_core::{AppError, AppResult};
use obsq_domain::{LogEntry, SearchRequest, SearchScope, WorkflowLogEntry};

use crate::hit_normalizer::{normalize_log, normalize_workflow_log};
use crate::query_compiler::compile;
use crate::search_ports::{DataStream, SearchBackend};

#[cfg(test)]
mod tests;

/// Log lines of one query; the shape follows the request scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogRecords {
    /// Application logs of a component scope.
    Component(Vec<LogEntry>),
    /// CI logs of a workflow run.
    Workflow(Vec<WorkflowLogEntry>),
}

impl LogRecords {
    /// Returns the number of returned lines.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Component(entries) => entries.len(),
            Self::Workflow(entries) => entries.len(),
        }
    }

    /// Returns whether no line was returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a log query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQueryResult {
    /// Returned lines.
    pub logs: LogRecords,
    /// Total matching lines reported by the backend.
    pub total: i64,
    /// Backend execution time in milliseconds.
    pub took_ms: i64,
}

/// Application service for component and workflow log queries.
#[derive(Clone)]
pub struct LogQueryService {
    backend: Arc<dyn SearchBackend>,
    stream: DataStream,
}

impl LogQueryService {
    /// Creates a service querying the given log stream.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>, stream_name: impl Into<String>) -> Self {
        Self {
            backend,
            stream: DataStream::logs(stream_name),
        }
    }

    /// Runs a component or workflow log query.
    pub async fn query_logs(&self, request: &SearchRequest) -> AppResult<LogQueryResult> {
        let workflow = match &request.scope {
            SearchScope::Component(_) => false,
            SearchScope::Workflow(_) => true,
            SearchScope::Trace(_) | SearchScope::Span(_) => {
                return Err(AppError::Validation(format!(
                    "{} scope is not a log scope",
                    request.scope.scope_type()
                )));
            }
        };

        let query = compile(request, &self.stream)?;
        let response = self.backend.search(&query).await?;

        let logs = if workflow {
            LogRecords::Workflow(response.hits.iter().map(normalize_workflow_log).collect())
        } else {
            LogRecords::Component(response.hits.iter().map(normalize_log).collect())
        };

        info!(
            scope = request.scope.scope_type(),
            returned = logs.len(),
            total = response.total,
            took_ms = response.took,
            "log query completed"
        );

        Ok(LogQueryResult {
            logs,
            total: response.total,
            took_ms: response.took,
        })
    }
}
