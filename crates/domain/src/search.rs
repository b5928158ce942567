use chrono::{DateTime, Utc};
use obsq_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::SearchScope;

/// Row limit applied when a request carries none or a non-positive one.
pub const DEFAULT_LIMIT: i64 = 100;

/// Absolute UTC window a search scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TimeRangeInput")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a validated time range.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end < start {
            return Err(AppError::Validation(
                "endTime must not be earlier than startTime".to_owned(),
            ));
        }

        Ok(Self { start, end })
    }

    /// Returns the inclusive start of the window.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive end of the window.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the window start as microseconds since the Unix epoch.
    #[must_use]
    pub fn start_micros(&self) -> i64 {
        self.start.timestamp_micros()
    }

    /// Returns the window end as microseconds since the Unix epoch.
    #[must_use]
    pub fn end_micros(&self) -> i64 {
        self.end.timestamp_micros()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeRangeInput {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<TimeRangeInput> for TimeRange {
    type Error = AppError;

    fn try_from(input: TimeRangeInput) -> Result<Self, Self::Error> {
        Self::new(input.start, input.end)
    }
}

/// Result ordering on the start-time column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parses a caller-supplied direction, falling back to descending for
    /// anything other than a case-insensitive `asc`.
    #[must_use]
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// Returns the SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Optional narrowing applied on top of a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Free-text phrase matched as a substring of the log line.
    ///
    /// The phrase becomes a `LIKE` pattern with its quotes escaped but its
    /// `%` and `_` left as wildcards, so `a_b` also matches `axb`.
    #[serde(default)]
    pub search_phrase: Option<String>,
    /// Accepted log levels; any one of them matches.
    #[serde(default)]
    pub log_levels: Vec<String>,
    /// Requested row limit; non-positive values mean [`DEFAULT_LIMIT`].
    #[serde(default)]
    pub limit: Option<i64>,
    /// Requested sort direction, parsed leniently.
    #[serde(default)]
    pub sort_order: Option<String>,
}

impl Filter {
    /// Returns the limit after defaulting.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_LIMIT,
        }
    }

    /// Returns the sort direction after defaulting.
    #[must_use]
    pub fn effective_sort_order(&self) -> SortOrder {
        SortOrder::parse_lenient(self.sort_order.as_deref())
    }

    /// Returns the search phrase when a non-empty one was given.
    #[must_use]
    pub fn search_phrase(&self) -> Option<&str> {
        self.search_phrase
            .as_deref()
            .filter(|phrase| !phrase.is_empty())
    }

    /// Returns the distinct non-blank log levels in first-seen order.
    #[must_use]
    pub fn distinct_log_levels(&self) -> Vec<&str> {
        let mut levels: Vec<&str> = Vec::with_capacity(self.log_levels.len());
        for level in &self.log_levels {
            let level = level.trim();
            if !level.is_empty() && !levels.contains(&level) {
                levels.push(level);
            }
        }
        levels
    }
}

/// A typed search request as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Window to scan.
    pub time_range: TimeRange,
    /// Entity being searched within.
    pub scope: SearchScope,
    /// Optional narrowing.
    #[serde(default)]
    pub filter: Filter,
}

impl SearchRequest {
    /// Creates a search request with an empty filter.
    #[must_use]
    pub fn new(time_range: TimeRange, scope: SearchScope) -> Self {
        Self {
            time_range,
            scope,
            filter: Filter::default(),
        }
    }

    /// Replaces the request filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}
