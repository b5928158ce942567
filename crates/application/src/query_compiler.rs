use obsq_core::{AppError, AppResult, escape_literal, quote_identifier};
use obsq_domain::{
    ComponentScope, Filter, SearchRequest, SearchScope, SortOrder, SpanLookup, TimeRange,
    TraceLookup, WorkflowScope,
};
use tracing::debug;

use crate::columns::{
    COMPONENT_LOG_PROJECTION, LABEL_COMPONENT_UID, LABEL_ENVIRONMENT_UID, LABEL_NAMESPACE,
    LABEL_PROJECT_UID, LOG_LEVEL, LOG_MESSAGE, LOG_TIMESTAMP, SERVICE_COMPONENT_UID,
    SERVICE_ENVIRONMENT_UID, SERVICE_NAMESPACE, SERVICE_PROJECT_UID, SPAN_ID,
    SPAN_LIST_PROJECTION, SPAN_START, TRACE_ID, TRACE_LIST_PROJECTION, WORKFLOW_NAMESPACE,
    WORKFLOW_NAMESPACE_PREFIX, WORKFLOW_RUN,
};
use crate::search_ports::{CompiledQuery, DataStream, StreamType};


/// Size sentinel asking the backend for every matching row.
pub const UNBOUNDED_SIZE: i64 = -1;

/// Span lookups scan the whole retained history.
const SPAN_LOOKUP_START_MICROS: i64 = 1;
const SPAN_LOOKUP_END_MICROS: i64 = i64::MAX / 2;

/// Compiles a scoped search request into a backend query for `stream`.
///
/// Pure apart from debug logging of the generated SQL.
pub fn compile(request: &SearchRequest, stream: &DataStream) -> AppResult<CompiledQuery> {
    let query = match (&request.scope, stream.stream_type) {
        (SearchScope::Component(scope), StreamType::Logs) => {
            compile_component_logs(scope, &request.filter, request.time_range, stream)?
        }
        (SearchScope::Workflow(scope), StreamType::Logs) => {
            compile_workflow_logs(scope, &request.filter, request.time_range, stream)?
        }
        (SearchScope::Component(scope), StreamType::Traces) => {
            compile_trace_list(scope, &request.filter, request.time_range, stream)?
        }
        (SearchScope::Trace(lookup), StreamType::Traces) => {
            compile_span_list(lookup, &request.filter, request.time_range, stream)?
        }
        (SearchScope::Span(lookup), StreamType::Traces) => {
            return compile_span_lookup(lookup, stream);
        }
        (scope, stream_type) => {
            return Err(AppError::Validation(format!(
                "{} scope cannot be searched in a {} stream",
                scope.scope_type(),
                stream_type.as_str()
            )));
        }
    };

    log_compiled(&query, stream);
    Ok(query)
}

/// Compiles a single-span lookup. The request window is not used.
pub fn compile_span_lookup(lookup: &SpanLookup, stream: &DataStream) -> AppResult<CompiledQuery> {
    if stream.stream_type != StreamType::Traces {
        return Err(AppError::Validation(format!(
            "span lookups require a traces stream, got {}",
            stream.stream_type.as_str()
        )));
    }

    let trace_id = required("traceId", lookup.trace_id.as_str())?;
    let span_id = required("spanId", lookup.span_id.as_str())?;

    let mut predicates = Predicates::default();
    predicates.equals(TRACE_ID, trace_id);
    predicates.equals(SPAN_ID, span_id);

    let query = CompiledQuery {
        text: SelectStatement {
            projection: Projection::All,
            stream: stream.name.as_str(),
            predicates,
            order_column: SPAN_START,
            sort_order: SortOrder::Desc,
        }
        .render(),
        start_time: SPAN_LOOKUP_START_MICROS,
        end_time: SPAN_LOOKUP_END_MICROS,
        offset: 0,
        size: 1,
        stream_type: StreamType::Traces,
    };

    log_compiled(&query, stream);
    Ok(query)
}

fn compile_component_logs(
    scope: &ComponentScope,
    filter: &Filter,
    time_range: TimeRange,
    stream: &DataStream,
) -> AppResult<CompiledQuery> {
    let namespace = required("namespace", scope.namespace.as_str())?;

    let mut predicates = Predicates::default();
    predicates.equals(LABEL_NAMESPACE, namespace);
    predicates.equals_optional(LABEL_PROJECT_UID, scope.project_id.as_deref());
    predicates.equals_optional(LABEL_ENVIRONMENT_UID, scope.environment_id.as_deref());
    predicates.equals_optional(LABEL_COMPONENT_UID, scope.component_id.as_deref());
    predicates.log_filters(filter);

    Ok(CompiledQuery {
        text: SelectStatement {
            projection: Projection::Columns(COMPONENT_LOG_PROJECTION),
            stream: stream.name.as_str(),
            predicates,
            order_column: LOG_TIMESTAMP,
            sort_order: filter.effective_sort_order(),
        }
        .render(),
        start_time: time_range.start_micros(),
        end_time: time_range.end_micros(),
        offset: 0,
        size: filter.effective_limit(),
        stream_type: StreamType::Logs,
    })
}

fn compile_workflow_logs(
    scope: &WorkflowScope,
    filter: &Filter,
    time_range: TimeRange,
    stream: &DataStream,
) -> AppResult<CompiledQuery> {
    let namespace = required("namespace", scope.namespace.as_str())?;
    let workflow_run_name = required("workflowRunName", scope.workflow_run_name.as_str())?;

    let mut predicates = Predicates::default();
    predicates.equals(
        WORKFLOW_NAMESPACE,
        format!("{WORKFLOW_NAMESPACE_PREFIX}{namespace}").as_str(),
    );
    predicates.equals(WORKFLOW_RUN, workflow_run_name);
    predicates.log_filters(filter);

    // Workflow rows keep every column as metadata, so the projection stays open.
    Ok(CompiledQuery {
        text: SelectStatement {
            projection: Projection::All,
            stream: stream.name.as_str(),
            predicates,
            order_column: LOG_TIMESTAMP,
            sort_order: filter.effective_sort_order(),
        }
        .render(),
        start_time: time_range.start_micros(),
        end_time: time_range.end_micros(),
        offset: 0,
        size: filter.effective_limit(),
        stream_type: StreamType::Logs,
    })
}

fn compile_trace_list(
    scope: &ComponentScope,
    filter: &Filter,
    time_range: TimeRange,
    stream: &DataStream,
) -> AppResult<CompiledQuery> {
    reject_log_filters(filter)?;
    let namespace = required("namespace", scope.namespace.as_str())?;

    let mut predicates = Predicates::default();
    predicates.equals(SERVICE_NAMESPACE, namespace);
    predicates.equals_optional(SERVICE_PROJECT_UID, scope.project_id.as_deref());
    predicates.equals_optional(SERVICE_ENVIRONMENT_UID, scope.environment_id.as_deref());
    predicates.equals_optional(SERVICE_COMPONENT_UID, scope.component_id.as_deref());

    // Grouping needs every span of every trace in the window.
    Ok(CompiledQuery {
        text: SelectStatement {
            projection: Projection::Columns(TRACE_LIST_PROJECTION),
            stream: stream.name.as_str(),
            predicates,
            order_column: SPAN_START,
            sort_order: filter.effective_sort_order(),
        }
        .render(),
        start_time: time_range.start_micros(),
        end_time: time_range.end_micros(),
        offset: 0,
        size: UNBOUNDED_SIZE,
        stream_type: StreamType::Traces,
    })
}

fn compile_span_list(
    lookup: &TraceLookup,
    filter: &Filter,
    time_range: TimeRange,
    stream: &DataStream,
) -> AppResult<CompiledQuery> {
    reject_log_filters(filter)?;
    let trace_id = required("traceId", lookup.trace_id.as_str())?;

    let mut predicates = Predicates::default();
    predicates.equals(TRACE_ID, trace_id);

    Ok(CompiledQuery {
        text: SelectStatement {
            projection: Projection::Columns(SPAN_LIST_PROJECTION),
            stream: stream.name.as_str(),
            predicates,
            order_column: SPAN_START,
            sort_order: filter.effective_sort_order(),
        }
        .render(),
        start_time: time_range.start_micros(),
        end_time: time_range.end_micros(),
        offset: 0,
        size: filter.effective_limit(),
        stream_type: StreamType::Traces,
    })
}

fn required<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!(
            "{field} is required and must not be blank"
        )));
    }

    Ok(trimmed)
}

fn reject_log_filters(filter: &Filter) -> AppResult<()> {
    if filter.search_phrase().is_some() || !filter.distinct_log_levels().is_empty() {
        return Err(AppError::Validation(
            "searchPhrase and logLevels are only supported for log queries".to_owned(),
        ));
    }

    Ok(())
}

fn log_compiled(query: &CompiledQuery, stream: &DataStream) {
    debug!(
        stream = %stream.name,
        stream_type = stream.stream_type.as_str(),
        sql = %query.text,
        start_time = query.start_time,
        end_time = query.end_time,
        size = query.size,
        "compiled search query"
    );
}

/// SQL predicates joined with `AND`.
#[derive(Debug, Default)]
struct Predicates(Vec<String>);

impl Predicates {
    fn equals(&mut self, column: &'static str, value: &str) {
        self.0.push(equality(column, value));
    }

    fn equals_optional(&mut self, column: &'static str, value: Option<&str>) {
        if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
            self.equals(column, value);
        }
    }

    // `%` and `_` in the phrase stay LIKE wildcards.
    fn contains(&mut self, column: &'static str, phrase: &str) {
        self.0
            .push(format!("{column} LIKE '%{}%'", escape_literal(phrase)));
    }

    fn equals_any(&mut self, column: &'static str, values: &[&str]) {
        match values {
            [] => {}
            [value] => self.equals(column, value),
            values => {
                let alternatives = values
                    .iter()
                    .map(|value| equality(column, value))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                self.0.push(format!("({alternatives})"));
            }
        }
    }

    fn log_filters(&mut self, filter: &Filter) {
        if let Some(phrase) = filter.search_phrase() {
            self.contains(LOG_MESSAGE, phrase);
        }
        self.equals_any(LOG_LEVEL, filter.distinct_log_levels().as_slice());
    }
}

fn equality(column: &'static str, value: &str) -> String {
    format!("{column} = '{}'", escape_literal(value))
}

#[derive(Debug, Clone, Copy)]
enum Projection {
    All,
    Columns(&'static [&'static str]),
}

struct SelectStatement<'a> {
    projection: Projection,
    stream: &'a str,
    predicates: Predicates,
    order_column: &'static str,
    sort_order: SortOrder,
}

impl SelectStatement<'_> {
    fn render(self) -> String {
        let projection = match self.projection {
            Projection::All => "*".to_owned(),
            Projection::Columns(columns) => columns.join(", "),
        };

        let mut sql = format!(
            "SELECT {projection} FROM {}",
            quote_identifier(self.stream)
        );

        if !self.predicates.0.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(self.predicates.0.join(" AND ").as_str());
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(self.order_column);
        sql.push(' ');
        sql.push_str(self.sort_order.as_sql());
        sql
    }
}
