use async_trait::async_trait;
use serde_json::{Map, Value};

use obsq_core::AppResult;

/// One backend row: column name to value.
pub type RawHit = Map<String, Value>;

/// Kind of data a stream holds; selects the backend search flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    /// Container and workflow log lines.
    Logs,
    /// Distributed tracing spans.
    Traces,
}

impl StreamType {
    /// Returns the stable stream type value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logs => "logs",
            Self::Traces => "traces",
        }
    }
}

/// Named backend stream a query targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStream {
    /// Stream name as known to the backend.
    pub name: String,
    /// What the stream holds.
    pub stream_type: StreamType,
}

impl DataStream {
    /// Creates a log stream reference.
    #[must_use]
    pub fn logs(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stream_type: StreamType::Logs,
        }
    }

    /// Creates a trace stream reference.
    #[must_use]
    pub fn traces(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stream_type: StreamType::Traces,
        }
    }
}

/// Backend-ready query document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// SQL text. Caller-controlled values only appear escaped.
    pub text: String,
    /// Inclusive window start in microseconds since the Unix epoch.
    pub start_time: i64,
    /// Inclusive window end in microseconds since the Unix epoch.
    pub end_time: i64,
    /// Row offset.
    pub offset: i64,
    /// Row count; `-1` asks for every matching row.
    pub size: i64,
    /// Search flavour the query must be sent with.
    pub stream_type: StreamType,
}

/// Decoded search envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Backend execution time in milliseconds.
    pub took: i64,
    /// Total matching rows reported by the backend.
    pub total: i64,
    /// Returned rows.
    pub hits: Vec<RawHit>,
}

/// Port for the search backend's query endpoint.
///
/// Implementations hold only immutable configuration; concurrent calls are
/// independent. Dropping the returned future cancels the outbound request.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Executes one compiled query.
    async fn search(&self, query: &CompiledQuery) -> AppResult<SearchResponse>;
}
