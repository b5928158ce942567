use serde::{Deserialize, Serialize};
use serde_json::Value;

use obsq_application::CompiledQuery;

/// Long-running searches are bounded by the HTTP client instead.
const SERVER_TIMEOUT_DISABLED: i64 = 0;

#[derive(Debug, Serialize)]
pub(super) struct SearchRequestBody<'a> {
    query: SearchQueryBody<'a>,
    timeout: i64,
}

#[derive(Debug, Serialize)]
struct SearchQueryBody<'a> {
    sql: &'a str,
    start_time: i64,
    end_time: i64,
    from: i64,
    size: i64,
}

impl<'a> From<&'a CompiledQuery> for SearchRequestBody<'a> {
    fn from(query: &'a CompiledQuery) -> Self {
        Self {
            query: SearchQueryBody {
                sql: query.text.as_str(),
                start_time: query.start_time,
                end_time: query.end_time,
                from: query.offset,
                size: query.size,
            },
            timeout: SERVER_TIMEOUT_DISABLED,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchEnvelope {
    #[serde(default)]
    pub(super) took: i64,
    #[serde(default)]
    pub(super) total: i64,
    #[serde(default)]
    pub(super) hits: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateAlertResponse {
    #[serde(default)]
    pub(super) alert_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlertListResponse {
    #[serde(default)]
    pub(super) list: Vec<AlertListItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlertListItem {
    #[serde(default)]
    pub(super) alert_id: String,
    #[serde(default)]
    pub(super) name: String,
}
