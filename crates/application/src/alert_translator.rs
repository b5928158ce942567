use obsq_core::{AppError, AppResult, NonEmptyString, escape_literal, quote_identifier};
use obsq_domain::{AlertRule, map_operator};

use crate::alert_ports::{AlertCondition, AlertConfigDocument, AlertSummary};

/// Column the alert count query produces and the condition compares.
pub const MATCH_COUNT_COLUMN: &str = "match_count";

const REALTIME_DISABLED: &str = "no";
const SCHEDULED_ALERT_TYPE: &str = "scheduled";

/// Builds the backend alert document for a log rule.
///
/// The alert counts rows of `stream_name` whose log line matches the rule's
/// pattern and fires when the count satisfies the threshold condition. An
/// empty pattern matches every line, so the rule alerts on total log volume.
/// The rule's namespace and component identifiers do not scope the query.
pub fn to_alert_config(
    rule: &AlertRule,
    stream_name: &str,
    destination: &str,
) -> AppResult<AlertConfigDocument> {
    let name = NonEmptyString::for_field("name", rule.name.as_str())?;
    let operator = map_operator(rule.operator.as_str())?;

    let query = format!(
        "SELECT count(*) AS {MATCH_COUNT_COLUMN} FROM {} WHERE str_match(log, '{}')",
        quote_identifier(stream_name),
        escape_literal(rule.search_pattern.as_str()),
    );

    Ok(AlertConfigDocument {
        name: name.into(),
        stream_name: stream_name.to_owned(),
        query,
        condition: AlertCondition {
            column: MATCH_COUNT_COLUMN.to_owned(),
            operator: operator.to_owned(),
            value: rule.threshold_value,
        },
        duration: rule.window.clone(),
        frequency: rule.interval.clone(),
        is_realtime: REALTIME_DISABLED.to_owned(),
        destinations: vec![destination.to_owned()],
        alert_type: SCHEDULED_ALERT_TYPE.to_owned(),
    })
}

/// Finds the backend identifier of the alert named `name`.
///
/// The backend has no name index, so this is a linear scan of the listing.
pub fn resolve_alert_id(alerts: &[AlertSummary], name: &str) -> AppResult<String> {
    alerts
        .iter()
        .find(|alert| alert.name == name)
        .map(|alert| alert.alert_id.clone())
        .ok_or_else(|| AppError::NotFound(format!("alert '{name}' does not exist")))
}
