//! Maps raw backend rows onto typed records.
//!
//! Rows are never rejected: a missing or mistyped column degrades to the
//! field's zero value so one malformed hit cannot fail a whole batch.
//! Log rows carry microsecond timestamps, span rows nanosecond ones.

use chrono::{DateTime, Utc};
use serde_json::Value;

use obsq_domain::{LogEntry, SpanAttribute, SpanDetail, SpanEntry, SpanRow, WorkflowLogEntry};

use crate::columns::{
    CONTAINER_NAME, LABEL_COMPONENT_NAME, LABEL_COMPONENT_UID, LABEL_ENVIRONMENT_NAME,
    LABEL_ENVIRONMENT_UID, LABEL_NAMESPACE, LABEL_PROJECT_NAME, LABEL_PROJECT_UID, LOG_LEVEL,
    LOG_MESSAGE, LOG_TIMESTAMP, POD_NAME, POD_NAMESPACE, RESERVED_SPAN_COLUMNS,
    RESOURCE_ATTRIBUTE_PREFIXES, SPAN_DURATION, SPAN_END, SPAN_ID, SPAN_KIND, SPAN_NAME,
    SPAN_PARENT_ID, SPAN_START, TRACE_ID,
};
use crate::search_ports::RawHit;

/// Normalizes a component log row.
#[must_use]
pub fn normalize_log(hit: &RawHit) -> LogEntry {
    LogEntry {
        timestamp: micros_field(hit, LOG_TIMESTAMP),
        message: string_field(hit, LOG_MESSAGE),
        level: string_field(hit, LOG_LEVEL),
        namespace: optional_string_field(hit, LABEL_NAMESPACE),
        project_id: optional_string_field(hit, LABEL_PROJECT_UID),
        project_name: optional_string_field(hit, LABEL_PROJECT_NAME),
        environment_id: optional_string_field(hit, LABEL_ENVIRONMENT_UID),
        environment_name: optional_string_field(hit, LABEL_ENVIRONMENT_NAME),
        component_id: optional_string_field(hit, LABEL_COMPONENT_UID),
        component_name: optional_string_field(hit, LABEL_COMPONENT_NAME),
        pod_name: optional_string_field(hit, POD_NAME),
        pod_namespace: optional_string_field(hit, POD_NAMESPACE),
        container_name: optional_string_field(hit, CONTAINER_NAME),
    }
}

/// Normalizes a workflow log row, keeping every other column as metadata.
#[must_use]
pub fn normalize_workflow_log(hit: &RawHit) -> WorkflowLogEntry {
    let metadata = hit
        .iter()
        .filter(|(key, _)| key.as_str() != LOG_MESSAGE && key.as_str() != LOG_TIMESTAMP)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    WorkflowLogEntry {
        timestamp: micros_field(hit, LOG_TIMESTAMP),
        log: string_field(hit, LOG_MESSAGE),
        metadata,
    }
}

/// Normalizes a span list row.
#[must_use]
pub fn normalize_span(hit: &RawHit) -> SpanEntry {
    SpanEntry {
        span_id: string_field(hit, SPAN_ID),
        span_name: string_field(hit, SPAN_NAME),
        span_kind: string_field(hit, SPAN_KIND),
        start_time: nanos_field(hit, SPAN_START),
        end_time: nanos_field(hit, SPAN_END),
        duration_ns: integer_field(hit, SPAN_DURATION).unwrap_or_default(),
        parent_span_id: string_field(hit, SPAN_PARENT_ID),
    }
}

/// Normalizes a trace list row for reconstruction.
#[must_use]
pub fn normalize_span_row(hit: &RawHit) -> SpanRow {
    SpanRow {
        trace_id: string_field(hit, TRACE_ID),
        span_id: string_field(hit, SPAN_ID),
        span_name: string_field(hit, SPAN_NAME),
        span_kind: string_field(hit, SPAN_KIND),
        start_ns: integer_field(hit, SPAN_START),
        end_ns: integer_field(hit, SPAN_END),
        parent_span_id: string_field(hit, SPAN_PARENT_ID),
    }
}

/// Normalizes a full span row and buckets the remaining columns.
///
/// Columns whose key starts with a resource prefix (`service`, `resource`)
/// become resource attributes; every other unreserved column is a span
/// attribute. Both lists are ordered by key.
#[must_use]
pub fn normalize_span_detail(hit: &RawHit) -> SpanDetail {
    let mut attributes = Vec::new();
    let mut resource_attributes = Vec::new();

    for (key, value) in hit {
        if RESERVED_SPAN_COLUMNS.contains(&key.as_str()) {
            continue;
        }

        let attribute = SpanAttribute {
            key: key.clone(),
            value: render_value(value),
        };
        if is_resource_attribute(key) {
            resource_attributes.push(attribute);
        } else {
            attributes.push(attribute);
        }
    }

    attributes.sort_by(|left, right| left.key.cmp(&right.key));
    resource_attributes.sort_by(|left, right| left.key.cmp(&right.key));

    SpanDetail {
        span: normalize_span(hit),
        attributes,
        resource_attributes,
    }
}

fn is_resource_attribute(key: &str) -> bool {
    RESOURCE_ATTRIBUTE_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_field(hit: &RawHit, key: &str) -> String {
    hit.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

fn optional_string_field(hit: &RawHit, key: &str) -> Option<String> {
    hit.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Reads an integer column. Float encodings are truncated; anything else is
/// treated as absent.
fn integer_field(hit: &RawHit, key: &str) -> Option<i64> {
    let value = hit.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite())
            .map(|number| number as i64)
    })
}

fn micros_field(hit: &RawHit, key: &str) -> DateTime<Utc> {
    integer_field(hit, key)
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .unwrap_or_default()
}

fn nanos_field(hit: &RawHit, key: &str) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_nanos(integer_field(hit, key).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::search_ports::RawHit;

    use super::{
        normalize_log, normalize_span, normalize_span_detail, normalize_span_row,
        normalize_workflow_log,
    };

    fn hit(value: Value) -> RawHit {
        match value {
            Value::Object(map) => map,
            _ => RawHit::new(),
        }
    }

    #[test]
    fn log_rows_read_known_columns_in_microseconds() {
        let entry = normalize_log(&hit(json!({
            "_timestamp": 1_700_000_000_123_456_i64,
            "log": "started",
            "logLevel": "INFO",
            "kubernetes_labels_openchoreo_dev_namespace": "acme",
            "kubernetes_labels_openchoreo_dev_component_uid": "c1",
            "kubernetes_labels_openchoreo_dev_project_uid": "",
            "kubernetes_pod_name": "api-0",
            "unrelated": true
        })));

        assert_eq!(entry.timestamp.timestamp_micros(), 1_700_000_000_123_456);
        assert_eq!(entry.message, "started");
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.namespace.as_deref(), Some("acme"));
        assert_eq!(entry.component_id.as_deref(), Some("c1"));
        assert_eq!(entry.project_id, None);
        assert_eq!(entry.pod_name.as_deref(), Some("api-0"));
    }

    #[test]
    fn mistyped_columns_degrade_to_defaults() {
        let entry = normalize_log(&hit(json!({
            "_timestamp": "yesterday",
            "log": 42,
            "logLevel": null
        })));

        assert_eq!(entry.timestamp.timestamp(), 0);
        assert!(entry.message.is_empty());
        assert!(entry.level.is_empty());
    }

    #[test]
    fn float_timestamps_are_accepted() {
        let entry = normalize_log(&hit(json!({ "_timestamp": 1.7e15 })));

        assert_eq!(entry.timestamp.timestamp_micros(), 1_700_000_000_000_000);
    }

    #[test]
    fn workflow_rows_keep_everything_else_as_metadata() {
        let entry = normalize_workflow_log(&hit(json!({
            "_timestamp": 1_000_000,
            "log": "step 1",
            "kubernetes_pod_name": "build-42-step",
            "stream": "stdout"
        })));

        assert_eq!(entry.log, "step 1");
        assert_eq!(entry.timestamp.timestamp(), 1);
        assert_eq!(entry.metadata.len(), 2);
        assert_eq!(entry.metadata.get("stream"), Some(&json!("stdout")));
        assert!(!entry.metadata.contains_key("log"));
        assert!(!entry.metadata.contains_key("_timestamp"));
    }

    #[test]
    fn span_rows_keep_nanosecond_precision() {
        let row = hit(json!({
            "trace_id": "t1",
            "span_id": "s1",
            "operation_name": "GET /",
            "span_kind": "server",
            "start_time": 1_700_000_000_123_456_789_i64,
            "end_time": 1_700_000_000_223_456_789_i64,
            "duration": 100_000_000,
            "reference_parent_span_id": ""
        }));

        let span = normalize_span(&row);
        assert_eq!(span.start_time.timestamp_nanos_opt(), Some(1_700_000_000_123_456_789));
        assert_eq!(span.duration_ns, 100_000_000);
        assert!(span.is_root());

        let flat = normalize_span_row(&row);
        assert_eq!(flat.trace_id, "t1");
        assert_eq!(flat.start_ns, Some(1_700_000_000_123_456_789));
        assert_eq!(flat.end_ns, Some(1_700_000_000_223_456_789));
    }

    #[test]
    fn missing_span_times_are_absent_on_rows() {
        let flat = normalize_span_row(&hit(json!({ "trace_id": "t1", "start_time": "soon" })));

        assert_eq!(flat.start_ns, None);
        assert_eq!(flat.end_ns, None);
        assert!(flat.parent_span_id.is_empty());
    }

    #[test]
    fn span_detail_partitions_unreserved_columns() {
        let detail = normalize_span_detail(&hit(json!({
            "_timestamp": 1,
            "trace_id": "t1",
            "span_id": "s1",
            "operation_name": "GET /",
            "span_kind": "server",
            "start_time": 10,
            "end_time": 20,
            "duration": 10,
            "parent_span_id": "p0",
            "reference_parent_span_id": "p1",
            "service_name": "api",
            "resource_host": "node-a",
            "http_status_code": 200,
            "http_method": "GET",
            "retry": null,
            "tags": ["a", "b"]
        })));

        assert_eq!(detail.span.span_id, "s1");
        assert_eq!(detail.span.parent_span_id, "p1");

        let attributes = detail
            .attributes
            .iter()
            .map(|attribute| (attribute.key.as_str(), attribute.value.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            attributes,
            vec![
                ("http_method", "GET"),
                ("http_status_code", "200"),
                ("retry", ""),
                ("tags", "[\"a\",\"b\"]"),
            ]
        );

        let resource_keys = detail
            .resource_attributes
            .iter()
            .map(|attribute| attribute.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(resource_keys, vec!["resource_host", "service_name"]);
    }
}
