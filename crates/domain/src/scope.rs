use obsq_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Deployment identity used to scope application logs and traces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScope {
    /// Namespace that owns the component. Required.
    pub namespace: String,
    /// Optional project identifier.
    pub project_id: Option<String>,
    /// Optional environment identifier.
    pub environment_id: Option<String>,
    /// Optional component identifier.
    pub component_id: Option<String>,
}

/// Identity of one CI workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowScope {
    /// Namespace the workflow ran for. Required.
    pub namespace: String,
    /// Workflow run name. Required.
    pub workflow_run_name: String,
}

/// Point lookup of every span in one trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceLookup {
    /// Trace identifier. Required.
    pub trace_id: String,
}

/// Point lookup of a single span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLookup {
    /// Trace identifier. Required.
    pub trace_id: String,
    /// Span identifier. Required.
    pub span_id: String,
}

/// The entity a caller is searching within. Exactly one shape per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchScope {
    /// Application logs or traces of a deployment.
    Component(ComponentScope),
    /// CI workflow run logs.
    Workflow(WorkflowScope),
    /// All spans of one trace.
    Trace(TraceLookup),
    /// One span of one trace.
    Span(SpanLookup),
}

impl SearchScope {
    /// Returns stable scope type value.
    #[must_use]
    pub fn scope_type(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Workflow(_) => "workflow",
            Self::Trace(_) => "trace",
            Self::Span(_) => "span",
        }
    }

    /// Decides which scope shape an untagged transport payload carries.
    ///
    /// Blank strings count as absent. Payloads that populate fields of more
    /// than one shape are rejected rather than silently narrowed.
    pub fn resolve(raw: RawSearchScope) -> AppResult<Self> {
        let RawSearchScope {
            namespace,
            project_id,
            environment_id,
            component_id,
            workflow_run_name,
            trace_id,
            span_id,
        } = raw;

        let namespace = present(namespace);
        let project_id = present(project_id);
        let environment_id = present(environment_id);
        let component_id = present(component_id);
        let workflow_run_name = present(workflow_run_name);
        let trace_id = present(trace_id);
        let span_id = present(span_id);

        let has_deployment_fields =
            project_id.is_some() || environment_id.is_some() || component_id.is_some();
        let has_scope_fields =
            namespace.is_some() || has_deployment_fields || workflow_run_name.is_some();
        let has_lookup_fields = trace_id.is_some() || span_id.is_some();

        if has_lookup_fields && has_scope_fields {
            return Err(AppError::Validation(
                "ambiguous search scope: trace lookups cannot be combined with namespace or workflow fields"
                    .to_owned(),
            ));
        }

        if let Some(span_id) = span_id {
            let trace_id = trace_id.ok_or_else(|| {
                AppError::Validation("traceId is required for span lookups".to_owned())
            })?;
            return Ok(Self::Span(SpanLookup { trace_id, span_id }));
        }

        if let Some(trace_id) = trace_id {
            return Ok(Self::Trace(TraceLookup { trace_id }));
        }

        if let Some(workflow_run_name) = workflow_run_name {
            if has_deployment_fields {
                return Err(AppError::Validation(
                    "ambiguous search scope: workflowRunName cannot be combined with project, environment or component fields"
                        .to_owned(),
                ));
            }

            let namespace = namespace.ok_or_else(namespace_required)?;
            return Ok(Self::Workflow(WorkflowScope {
                namespace,
                workflow_run_name,
            }));
        }

        if has_scope_fields {
            let namespace = namespace.ok_or_else(namespace_required)?;
            return Ok(Self::Component(ComponentScope {
                namespace,
                project_id,
                environment_id,
                component_id,
            }));
        }

        Err(AppError::Validation("searchScope is required".to_owned()))
    }
}

/// Untagged scope payload as decoded from transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchScope {
    /// Namespace for component or workflow scopes.
    pub namespace: Option<String>,
    /// Project identifier for component scopes.
    pub project_id: Option<String>,
    /// Environment identifier for component scopes.
    pub environment_id: Option<String>,
    /// Component identifier for component scopes.
    pub component_id: Option<String>,
    /// Workflow run name for workflow scopes.
    pub workflow_run_name: Option<String>,
    /// Trace identifier for point lookups.
    pub trace_id: Option<String>,
    /// Span identifier for single span lookups.
    pub span_id: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

fn namespace_required() -> AppError {
    AppError::Validation("searchScope with a valid namespace is required".to_owned())
}

#[cfg(test)]
mod tests {
    use super::{ComponentScope, RawSearchScope, SearchScope, SpanLookup, WorkflowScope};

    fn raw() -> RawSearchScope {
        RawSearchScope::default()
    }

    #[test]
    fn resolves_component_scope_with_optional_fields() {
        let scope = SearchScope::resolve(RawSearchScope {
            namespace: Some(" default ".to_owned()),
            project_id: Some("proj-1".to_owned()),
            environment_id: Some("   ".to_owned()),
            ..raw()
        });

        assert!(scope.is_ok());
        assert_eq!(
            scope.unwrap_or_else(|_| unreachable!()),
            SearchScope::Component(ComponentScope {
                namespace: "default".to_owned(),
                project_id: Some("proj-1".to_owned()),
                environment_id: None,
                component_id: None,
            })
        );
    }

    #[test]
    fn resolves_workflow_scope_when_run_name_present() {
        let scope = SearchScope::resolve(RawSearchScope {
            namespace: Some("acme".to_owned()),
            workflow_run_name: Some("build-42".to_owned()),
            ..raw()
        });

        assert!(matches!(
            scope,
            Ok(SearchScope::Workflow(WorkflowScope { ref namespace, ref workflow_run_name }))
                if namespace == "acme" && workflow_run_name == "build-42"
        ));
    }

    #[test]
    fn workflow_scope_requires_namespace() {
        let scope = SearchScope::resolve(RawSearchScope {
            workflow_run_name: Some("build-42".to_owned()),
            ..raw()
        });

        assert!(scope.is_err());
    }

    #[test]
    fn component_fields_without_namespace_are_rejected() {
        let scope = SearchScope::resolve(RawSearchScope {
            component_id: Some("cmp".to_owned()),
            ..raw()
        });

        assert!(scope.is_err());
    }

    #[test]
    fn workflow_and_component_fields_are_ambiguous() {
        let scope = SearchScope::resolve(RawSearchScope {
            namespace: Some("acme".to_owned()),
            workflow_run_name: Some("build-42".to_owned()),
            component_id: Some("cmp".to_owned()),
            ..raw()
        });

        assert!(scope.is_err());
    }

    #[test]
    fn lookups_mixed_with_scope_fields_are_ambiguous() {
        let scope = SearchScope::resolve(RawSearchScope {
            namespace: Some("acme".to_owned()),
            trace_id: Some("t1".to_owned()),
            ..raw()
        });

        assert!(scope.is_err());
    }

    #[test]
    fn span_lookup_requires_trace_id() {
        let missing_trace = SearchScope::resolve(RawSearchScope {
            span_id: Some("s1".to_owned()),
            ..raw()
        });
        assert!(missing_trace.is_err());

        let lookup = SearchScope::resolve(RawSearchScope {
            trace_id: Some("t1".to_owned()),
            span_id: Some("s1".to_owned()),
            ..raw()
        });
        assert!(matches!(
            lookup,
            Ok(SearchScope::Span(SpanLookup { ref trace_id, ref span_id }))
                if trace_id == "t1" && span_id == "s1"
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(SearchScope::resolve(raw()).is_err());
    }

    #[test]
    fn raw_scope_decodes_camel_case() {
        let decoded = serde_json::from_str::<RawSearchScope>(
            r#"{"namespace":"acme","workflowRunName":"run-1"}"#,
        );

        assert!(decoded.is_ok());
        let decoded = decoded.unwrap_or_default();
        assert_eq!(decoded.workflow_run_name.as_deref(), Some("run-1"));
    }
}
