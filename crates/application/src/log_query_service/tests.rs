use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use obsq_core::{AppError, AppResult};
use obsq_domain::{
    ComponentScope, Filter, SearchRequest, SearchScope, TimeRange, TraceLookup, WorkflowScope,
};

use crate::search_ports::{CompiledQuery, RawHit, SearchBackend, SearchResponse, StreamType};

use super::{LogQueryService, LogRecords};

struct FakeSearchBackend {
    response: SearchResponse,
    queries: Mutex<Vec<CompiledQuery>>,
}

impl FakeSearchBackend {
    fn returning(hits: Vec<Value>, total: i64, took: i64) -> Self {
        let hits = hits
            .into_iter()
            .filter_map(|hit| match hit {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect::<Vec<RawHit>>();

        Self {
            response: SearchResponse { took, total, hits },
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchBackend for FakeSearchBackend {
    async fn search(&self, query: &CompiledQuery) -> AppResult<SearchResponse> {
        self.queries.lock().await.push(query.clone());
        Ok(self.response.clone())
    }
}

struct FailingSearchBackend;

#[async_trait]
impl SearchBackend for FailingSearchBackend {
    async fn search(&self, _query: &CompiledQuery) -> AppResult<SearchResponse> {
        Err(AppError::BackendStatus(502))
    }
}

fn window() -> TimeRange {
    let start = Utc
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or_default();
    TimeRange::new(start, start + Duration::minutes(15)).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn component_logs_are_normalized() {
    let backend = Arc::new(FakeSearchBackend::returning(
        vec![json!({
            "_timestamp": 1_700_000_000_000_001_i64,
            "log": "ready",
            "logLevel": "INFO",
            "kubernetes_labels_openchoreo_dev_component_uid": "c1"
        })],
        7,
        3,
    ));
    let service = LogQueryService::new(backend.clone(), "app-logs");
    let request = SearchRequest::new(
        window(),
        SearchScope::Component(ComponentScope {
            namespace: "acme".to_owned(),
            ..ComponentScope::default()
        }),
    )
    .with_filter(Filter {
        limit: Some(10),
        ..Filter::default()
    });

    let result = service.query_logs(&request).await;
    assert!(result.is_ok());
    let result = result.unwrap_or_else(|_| unreachable!());

    assert_eq!(result.total, 7);
    assert_eq!(result.took_ms, 3);
    match &result.logs {
        LogRecords::Component(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].message, "ready");
            assert_eq!(entries[0].component_id.as_deref(), Some("c1"));
        }
        LogRecords::Workflow(_) => panic!("expected component logs"),
    }

    let queries = backend.queries.lock().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].stream_type, StreamType::Logs);
    assert_eq!(queries[0].size, 10);
    assert!(queries[0].text.contains("FROM \"app-logs\""));
}

#[tokio::test]
async fn workflow_logs_keep_metadata() {
    let backend = Arc::new(FakeSearchBackend::returning(
        vec![
            json!({ "_timestamp": 1, "log": "clone", "kubernetes_pod_name": "step-1" }),
            json!({ "_timestamp": 2, "log": "build" }),
        ],
        2,
        1,
    ));
    let service = LogQueryService::new(backend, "ci");
    let request = SearchRequest::new(
        window(),
        SearchScope::Workflow(WorkflowScope {
            namespace: "acme".to_owned(),
            workflow_run_name: "build-42".to_owned(),
        }),
    );

    let result = service.query_logs(&request).await;

    assert!(matches!(
        result,
        Ok(result) if matches!(
            &result.logs,
            LogRecords::Workflow(entries)
                if entries.len() == 2
                    && entries[0].metadata.get("kubernetes_pod_name") == Some(&json!("step-1"))
        )
    ));
}

#[tokio::test]
async fn trace_scopes_are_rejected_before_the_backend() {
    let backend = Arc::new(FakeSearchBackend::returning(Vec::new(), 0, 0));
    let service = LogQueryService::new(backend.clone(), "app-logs");
    let request = SearchRequest::new(
        window(),
        SearchScope::Trace(TraceLookup {
            trace_id: "t1".to_owned(),
        }),
    );

    let result = service.query_logs(&request).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(backend.queries.lock().await.is_empty());
}

#[tokio::test]
async fn backend_failures_propagate() {
    let service = LogQueryService::new(Arc::new(FailingSearchBackend), "app-logs");
    let request = SearchRequest::new(
        window(),
        SearchScope::Component(ComponentScope {
            namespace: "acme".to_owned(),
            ..ComponentScope::default()
        }),
    );

    let result = service.query_logs(&request).await;

    assert!(matches!(result, Err(AppError::BackendStatus(502))));
}
