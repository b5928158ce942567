//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod alert;
mod records;
mod scope;
mod search;

pub use alert::{AlertOperator, AlertRule, map_operator};
pub use records::{
    LogEntry, SpanAttribute, SpanDetail, SpanEntry, SpanRow, TraceSummary, WorkflowLogEntry,
};
pub use scope::{
    ComponentScope, RawSearchScope, SearchScope, SpanLookup, TraceLookup, WorkflowScope,
};
pub use search::{DEFAULT_LIMIT, Filter, SearchRequest, SortOrder, TimeRange};
