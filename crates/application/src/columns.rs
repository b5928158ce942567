//! Column names of the log and trace streams. Shared by the compiler and the
//! normalizer so both sides agree on what a row carries.

pub(crate) const LOG_TIMESTAMP: &str = "_timestamp";
pub(crate) const LOG_MESSAGE: &str = "log";
pub(crate) const LOG_LEVEL: &str = "logLevel";

pub(crate) const LABEL_NAMESPACE: &str = "kubernetes_labels_openchoreo_dev_namespace";
pub(crate) const LABEL_PROJECT_UID: &str = "kubernetes_labels_openchoreo_dev_project_uid";
pub(crate) const LABEL_PROJECT_NAME: &str = "kubernetes_labels_openchoreo_dev_project_name";
pub(crate) const LABEL_ENVIRONMENT_UID: &str = "kubernetes_labels_openchoreo_dev_environment_uid";
pub(crate) const LABEL_ENVIRONMENT_NAME: &str =
    "kubernetes_labels_openchoreo_dev_environment_name";
pub(crate) const LABEL_COMPONENT_UID: &str = "kubernetes_labels_openchoreo_dev_component_uid";
pub(crate) const LABEL_COMPONENT_NAME: &str = "kubernetes_labels_openchoreo_dev_component_name";
pub(crate) const POD_NAME: &str = "kubernetes_pod_name";
pub(crate) const POD_NAMESPACE: &str = "kubernetes_pod_namespace";
pub(crate) const CONTAINER_NAME: &str = "kubernetes_container_name";

pub(crate) const WORKFLOW_NAMESPACE: &str = "kubernetes_namespace_name";
pub(crate) const WORKFLOW_RUN: &str = "kubernetes_labels_workflows_argoproj_io_workflow";
/// CI workloads run in a namespace derived from the owning namespace.
pub(crate) const WORKFLOW_NAMESPACE_PREFIX: &str = "openchoreo-ci-";

pub(crate) const SERVICE_NAMESPACE: &str = "service_openchoreo_dev_namespace";
pub(crate) const SERVICE_PROJECT_UID: &str = "service_openchoreo_dev_project_uid";
pub(crate) const SERVICE_ENVIRONMENT_UID: &str = "service_openchoreo_dev_environment_uid";
pub(crate) const SERVICE_COMPONENT_UID: &str = "service_openchoreo_dev_component_uid";

pub(crate) const TRACE_ID: &str = "trace_id";
pub(crate) const SPAN_ID: &str = "span_id";
pub(crate) const SPAN_NAME: &str = "operation_name";
pub(crate) const SPAN_KIND: &str = "span_kind";
pub(crate) const SPAN_START: &str = "start_time";
pub(crate) const SPAN_END: &str = "end_time";
pub(crate) const SPAN_DURATION: &str = "duration";
pub(crate) const SPAN_PARENT_ID: &str = "reference_parent_span_id";
pub(crate) const SPAN_PARENT_ID_ALT: &str = "parent_span_id";

/// Columns the component log normalizer reads.
pub(crate) const COMPONENT_LOG_PROJECTION: &[&str] = &[
    LOG_TIMESTAMP,
    LOG_MESSAGE,
    LOG_LEVEL,
    LABEL_NAMESPACE,
    LABEL_PROJECT_UID,
    LABEL_PROJECT_NAME,
    LABEL_ENVIRONMENT_UID,
    LABEL_ENVIRONMENT_NAME,
    LABEL_COMPONENT_UID,
    LABEL_COMPONENT_NAME,
    POD_NAME,
    POD_NAMESPACE,
    CONTAINER_NAME,
];

/// Columns needed to rebuild trace summaries.
pub(crate) const TRACE_LIST_PROJECTION: &[&str] = &[
    TRACE_ID,
    SPAN_ID,
    SPAN_NAME,
    SPAN_KIND,
    SPAN_START,
    SPAN_END,
    SPAN_PARENT_ID,
];

/// Columns of a trace's span list, with the duration derived server side.
pub(crate) const SPAN_LIST_PROJECTION: &[&str] = &[
    SPAN_ID,
    SPAN_NAME,
    SPAN_KIND,
    SPAN_START,
    SPAN_END,
    "end_time - start_time AS duration",
    SPAN_PARENT_ID,
];

/// Columns mapped onto span fields and therefore excluded from attributes.
pub(crate) const RESERVED_SPAN_COLUMNS: &[&str] = &[
    LOG_TIMESTAMP,
    TRACE_ID,
    SPAN_ID,
    SPAN_NAME,
    SPAN_KIND,
    SPAN_START,
    SPAN_END,
    SPAN_DURATION,
    SPAN_PARENT_ID,
    SPAN_PARENT_ID_ALT,
];

/// Attribute keys with these prefixes describe the emitting resource.
pub(crate) const RESOURCE_ATTRIBUTE_PREFIXES: &[&str] = &["service", "resource"];
