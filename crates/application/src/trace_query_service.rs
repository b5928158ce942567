use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use obsq_core::{AppError, AppResult};
use obsq_domain::{SearchRequest, SearchScope, SpanDetail, SpanEntry, SpanLookup, TraceSummary};

use crate::hit_normalizer::{normalize_span, normalize_span_detail, normalize_span_row};
use crate::query_compiler::{compile, compile_span_lookup};
use crate::search_ports::{DataStream, SearchBackend};
use crate::trace_reconstruction::reconstruct_traces;


/// Traces found in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceListResult {
    /// Reconstructed traces in first-seen order.
    pub traces: Vec<TraceSummary>,
    /// Number of traces.
    pub total: usize,
    /// Backend execution time in milliseconds.
    pub took_ms: i64,
}

/// Spans of one trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanListResult {
    /// Returned spans.
    pub spans: Vec<SpanEntry>,
    /// Total matching spans reported by the backend.
    pub total: i64,
    /// Backend execution time in milliseconds.
    pub took_ms: i64,
}

/// Application service for trace listing and span lookups.
#[derive(Clone)]
pub struct TraceQueryService {
    backend: Arc<dyn SearchBackend>,
    stream: DataStream,
}

impl TraceQueryService {
    /// Creates a service querying the given trace stream.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>, stream_name: impl Into<String>) -> Self {
        Self {
            backend,
            stream: DataStream::traces(stream_name),
        }
    }

    /// Lists the traces of a component scope within the request window.
    pub async fn list_traces(&self, request: &SearchRequest) -> AppResult<TraceListResult> {
        if !matches!(request.scope, SearchScope::Component(_)) {
            return Err(AppError::Validation(
                "listing traces requires a component scope".to_owned(),
            ));
        }

        let query = compile(request, &self.stream)?;
        let response = self.backend.search(&query).await?;

        let rows = response
            .hits
            .iter()
            .map(normalize_span_row)
            .collect::<Vec<_>>();
        let traces = reconstruct_traces(&rows);

        info!(
            spans = rows.len(),
            traces = traces.len(),
            took_ms = response.took,
            "trace list reconstructed"
        );

        Ok(TraceListResult {
            total: traces.len(),
            traces,
            took_ms: response.took,
        })
    }

    /// Lists the spans of the trace named by a trace scope.
    pub async fn list_spans(&self, request: &SearchRequest) -> AppResult<SpanListResult> {
        if !matches!(request.scope, SearchScope::Trace(_)) {
            return Err(AppError::Validation(
                "listing spans requires a trace scope".to_owned(),
            ));
        }

        let query = compile(request, &self.stream)?;
        let response = self.backend.search(&query).await?;

        Ok(SpanListResult {
            spans: response.hits.iter().map(normalize_span).collect(),
            total: response.total,
            took_ms: response.took,
        })
    }

    /// Fetches one span with its attributes.
    pub async fn span_detail(&self, lookup: &SpanLookup) -> AppResult<SpanDetail> {
        let query = compile_span_lookup(lookup, &self.stream)?;
        let response = self.backend.search(&query).await?;

        response
            .hits
            .first()
            .map(normalize_span_detail)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "span '{}' of trace '{}' does not exist",
                    lookup.span_id.trim(),
                    lookup.trace_id.trim()
                ))
            })
    }
}
