//! Query compilation, result reconstruction and the services that drive the
//! search backend.

#![forbid(unsafe_code)]

mod alert_ports;
mod alert_rule_service;
mod alert_translator;
mod columns;
mod hit_normalizer;
mod log_query_service;
mod query_compiler;
mod search_ports;
mod trace_query_service;
mod trace_reconstruction;

pub use alert_ports::{
    AlertBackend, AlertCondition, AlertConfigDocument, AlertSummary, AlertSyncAction,
    AlertSyncResult, AlertSyncStatus, DEFAULT_ALERT_DESTINATION,
};
pub use alert_rule_service::AlertRuleService;
pub use alert_translator::{MATCH_COUNT_COLUMN, resolve_alert_id, to_alert_config};
pub use hit_normalizer::{
    normalize_log, normalize_span, normalize_span_detail, normalize_span_row,
    normalize_workflow_log,
};
pub use log_query_service::{LogQueryResult, LogQueryService, LogRecords};
pub use query_compiler::{UNBOUNDED_SIZE, compile, compile_span_lookup};
pub use search_ports::{
    CompiledQuery, DataStream, RawHit, SearchBackend, SearchResponse, StreamType,
};
pub use trace_query_service::{SpanListResult, TraceListResult, TraceQueryService};
pub use trace_reconstruction::reconstruct_traces;
