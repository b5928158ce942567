use std::str::FromStr;

use obsq_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Threshold comparison applied to an alert's match count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOperator {
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
}

impl AlertOperator {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Eq => "eq",
            Self::Neq => "neq",
        }
    }

    /// Returns the SQL comparison symbol.
    #[must_use]
    pub fn as_sql_symbol(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Eq => "=",
            Self::Neq => "!=",
        }
    }
}

impl FromStr for AlertOperator {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            _ => Err(AppError::Validation(format!(
                "unsupported operator '{value}': must be one of gt, gte, lt, lte, eq, neq"
            ))),
        }
    }
}

/// Maps a transport operator to its SQL comparison symbol.
pub fn map_operator(operator: &str) -> AppResult<&'static str> {
    operator
        .parse::<AlertOperator>()
        .map(|operator| operator.as_sql_symbol())
}

/// Log alert rule as received from the transport layer.
///
/// The operator is kept as text so that unsupported values surface as a
/// validation error at translation time rather than a decode failure.
/// The namespace, project, environment and component identifiers are carried
/// for the caller; the generated alert query counts matches across the whole
/// stream and is not scoped by them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Logical rule name; the only handle the backend can be searched by.
    pub name: String,
    /// Namespace that owns the rule.
    pub namespace: String,
    /// Optional project identifier.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Optional environment identifier.
    #[serde(default)]
    pub environment_id: Option<String>,
    /// Optional component identifier.
    #[serde(default)]
    pub component_id: Option<String>,
    /// Pattern the log line must match; empty matches every line.
    pub search_pattern: String,
    /// Comparison operator: one of gt, gte, lt, lte, eq, neq.
    pub operator: String,
    /// Threshold the match count is compared with.
    pub threshold_value: f64,
    /// Evaluation window, in the backend's duration units.
    pub window: String,
    /// Evaluation interval, in the backend's duration units.
    pub interval: String,
}
