use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Application log line with its deployment identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// When the line was emitted.
    pub timestamp: DateTime<Utc>,
    /// Raw log message.
    pub message: String,
    /// Log level reported by the collector.
    pub level: String,
    /// Namespace name.
    pub namespace: Option<String>,
    /// Project identifier.
    pub project_id: Option<String>,
    /// Project display name.
    pub project_name: Option<String>,
    /// Environment identifier.
    pub environment_id: Option<String>,
    /// Environment display name.
    pub environment_name: Option<String>,
    /// Component identifier.
    pub component_id: Option<String>,
    /// Component display name.
    pub component_name: Option<String>,
    /// Pod that produced the line.
    pub pod_name: Option<String>,
    /// Namespace of the pod.
    pub pod_namespace: Option<String>,
    /// Container that produced the line.
    pub container_name: Option<String>,
}

/// CI workflow log line. Every other backend column is kept as metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowLogEntry {
    /// When the line was emitted.
    pub timestamp: DateTime<Utc>,
    /// Raw log message.
    pub log: String,
    /// Remaining columns of the row.
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub metadata: Map<String, Value>,
}

/// One span as shown in a trace's span list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEntry {
    /// Span identifier.
    pub span_id: String,
    /// Operation name.
    pub span_name: String,
    /// Span kind.
    pub span_kind: String,
    /// Span start.
    pub start_time: DateTime<Utc>,
    /// Span end.
    pub end_time: DateTime<Utc>,
    /// Duration in nanoseconds.
    pub duration_ns: i64,
    /// Parent span identifier; empty for a root span.
    pub parent_span_id: String,
}

impl SpanEntry {
    /// Returns whether this span has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_empty()
    }
}

/// Rendered key/value attribute of a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAttribute {
    /// Attribute key as stored by the backend.
    pub key: String,
    /// Attribute value rendered as text.
    pub value: String,
}

/// A single span with every non-reserved column bucketed into attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanDetail {
    /// Core span fields.
    #[serde(flatten)]
    pub span: SpanEntry,
    /// Span-scoped attributes.
    pub attributes: Vec<SpanAttribute>,
    /// Resource and service attributes.
    pub resource_attributes: Vec<SpanAttribute>,
}

/// Flat span row used to rebuild traces.
///
/// Start and end are raw nanosecond epoch offsets; `None` when the backend
/// omitted the column or sent a non-integer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanRow {
    /// Trace the span belongs to.
    pub trace_id: String,
    /// Span identifier.
    pub span_id: String,
    /// Operation name.
    pub span_name: String,
    /// Span kind.
    pub span_kind: String,
    /// Start in nanoseconds since the Unix epoch.
    pub start_ns: Option<i64>,
    /// End in nanoseconds since the Unix epoch.
    pub end_ns: Option<i64>,
    /// Parent span identifier; empty for a root span.
    pub parent_span_id: String,
}

/// Per-trace aggregate rebuilt from span rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    /// Trace identifier.
    pub trace_id: String,
    /// Name of the root span; empty when no root was identified.
    pub trace_name: String,
    /// Number of spans seen for the trace.
    pub span_count: usize,
    /// Earliest span start.
    pub start_time: DateTime<Utc>,
    /// Latest span end.
    pub end_time: DateTime<Utc>,
    /// `end_time - start_time` in nanoseconds.
    pub duration_ns: i64,
    /// Root span identifier.
    pub root_span_id: String,
    /// Root span operation name.
    pub root_span_name: String,
    /// Root span kind.
    pub root_span_kind: String,
}
