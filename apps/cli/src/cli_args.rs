use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};

use obsq_core::AppResult;
use obsq_domain::{AlertRule, Filter, RawSearchScope, SearchRequest, SearchScope, TimeRange};

/// Scoped log, trace and alert queries against OpenObserve.
#[derive(Debug, Parser)]
#[command(name = "obsq", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query component or workflow logs.
    Logs {
        #[command(subcommand)]
        target: LogsCommand,
    },

    /// List traces, the spans of a trace, or one span.
    Traces {
        #[command(subcommand)]
        target: TracesCommand,
    },

    /// Manage log alert rules.
    Alerts {
        #[command(subcommand)]
        action: AlertsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// Application logs of a component, environment or project.
    Component {
        #[command(flatten)]
        scope: ComponentArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Logs of one CI workflow run.
    Workflow {
        #[arg(long)]
        namespace: String,
        /// Workflow run name.
        #[arg(long = "run")]
        workflow_run_name: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum TracesCommand {
    /// Traces of a component within the window.
    List {
        #[command(flatten)]
        scope: ComponentArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Spans of one trace.
    Spans {
        #[arg(long)]
        trace_id: String,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// One span with its attributes.
    Span {
        #[arg(long)]
        trace_id: String,
        #[arg(long)]
        span_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// Create an alert rule.
    Create(AlertRuleArgs),

    /// Replace the alert rule with the same name, creating it if missing.
    Update(AlertRuleArgs),

    /// Delete an alert rule by name.
    Delete {
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ComponentArgs {
    #[arg(long)]
    pub namespace: String,
    /// Project identifier.
    #[arg(long)]
    pub project: Option<String>,
    /// Environment identifier.
    #[arg(long)]
    pub environment: Option<String>,
    /// Component identifier.
    #[arg(long)]
    pub component: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Window start (RFC 3339). Defaults to one hour before the end.
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    /// Window end (RFC 3339). Defaults to now.
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
    /// Substring the log line must contain.
    #[arg(long)]
    pub search: Option<String>,
    /// Accepted log level; repeat for several.
    #[arg(long = "level")]
    pub levels: Vec<String>,
    /// Maximum rows; non-positive values use the default.
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,
    /// `asc` or `desc`.
    #[arg(long)]
    pub sort: Option<String>,
}

impl FilterArgs {
    pub fn time_range(&self, now: DateTime<Utc>) -> AppResult<TimeRange> {
        let end = self.end.unwrap_or(now);
        let start = self.start.unwrap_or(end - Duration::hours(1));
        TimeRange::new(start, end)
    }

    pub fn filter(&self) -> Filter {
        Filter {
            search_phrase: self.search.clone(),
            log_levels: self.levels.clone(),
            limit: self.limit,
            sort_order: self.sort.clone(),
        }
    }

    /// Resolves `scope` and assembles the request.
    pub fn request(&self, scope: RawSearchScope, now: DateTime<Utc>) -> AppResult<SearchRequest> {
        let scope = SearchScope::resolve(scope)?;
        Ok(SearchRequest::new(self.time_range(now)?, scope).with_filter(self.filter()))
    }
}

impl From<ComponentArgs> for RawSearchScope {
    fn from(args: ComponentArgs) -> Self {
        Self {
            namespace: Some(args.namespace),
            project_id: args.project,
            environment_id: args.environment,
            component_id: args.component,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct AlertRuleArgs {
    /// Rule name; the handle updates and deletes look the rule up by.
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub namespace: String,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub environment: Option<String>,
    #[arg(long)]
    pub component: Option<String>,
    /// Pattern matched against each log line.
    #[arg(long)]
    pub pattern: String,
    /// One of gt, gte, lt, lte, eq, neq.
    #[arg(long)]
    pub operator: String,
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: f64,
    /// Evaluation window, e.g. `5m`.
    #[arg(long)]
    pub window: String,
    /// Evaluation interval, e.g. `1m`.
    #[arg(long)]
    pub interval: String,
}

impl From<AlertRuleArgs> for AlertRule {
    fn from(args: AlertRuleArgs) -> Self {
        Self {
            name: args.name,
            namespace: args.namespace,
            project_id: args.project,
            environment_id: args.environment,
            component_id: args.component,
            search_pattern: args.pattern,
            operator: args.operator,
            threshold_value: args.threshold,
            window: args.window,
            interval: args.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use clap::Parser;

    use obsq_domain::{RawSearchScope, SearchScope};

    use super::{AlertsCommand, Cli, Command, FilterArgs, LogsCommand, TracesCommand};

    #[test]
    fn parses_component_log_query() {
        let cli = Cli::try_parse_from([
            "obsq",
            "logs",
            "component",
            "--namespace",
            "acme",
            "--component",
            "c1",
            "--level",
            "ERROR",
            "--level",
            "WARN",
            "--limit",
            "-5",
            "--sort",
            "asc",
        ]);

        assert!(matches!(
            cli,
            Ok(Cli {
                command: Command::Logs {
                    target: LogsCommand::Component { ref scope, ref filter },
                },
            }) if scope.namespace == "acme"
                && scope.component.as_deref() == Some("c1")
                && filter.levels == ["ERROR", "WARN"]
                && filter.limit == Some(-5)
        ));
    }

    #[test]
    fn parses_workflow_and_span_commands() {
        let workflow = Cli::try_parse_from([
            "obsq", "logs", "workflow", "--namespace", "acme", "--run", "build-42",
        ]);
        assert!(matches!(
            workflow,
            Ok(Cli {
                command: Command::Logs {
                    target: LogsCommand::Workflow { ref workflow_run_name, .. },
                },
            }) if workflow_run_name == "build-42"
        ));

        let span = Cli::try_parse_from([
            "obsq", "traces", "span", "--trace-id", "t1", "--span-id", "s1",
        ]);
        assert!(matches!(
            span,
            Ok(Cli {
                command: Command::Traces {
                    target: TracesCommand::Span { .. },
                },
            })
        ));
    }

    #[test]
    fn alert_create_requires_threshold() {
        let missing = Cli::try_parse_from([
            "obsq",
            "alerts",
            "create",
            "--name",
            "panics",
            "--namespace",
            "acme",
            "--pattern",
            "panic",
            "--operator",
            "gt",
            "--window",
            "5m",
            "--interval",
            "1m",
        ]);
        assert!(missing.is_err());

        let delete = Cli::try_parse_from(["obsq", "alerts", "delete", "--name", "panics"]);
        assert!(matches!(
            delete,
            Ok(Cli {
                command: Command::Alerts {
                    action: AlertsCommand::Delete { ref name },
                },
            }) if name == "panics"
        ));
    }

    #[test]
    fn window_defaults_to_the_last_hour() {
        let now = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_default();

        let range = FilterArgs::default().time_range(now);

        assert!(matches!(
            range,
            Ok(range) if range.end() == now && range.start() == now - Duration::hours(1)
        ));
    }

    #[test]
    fn request_resolves_the_scope() {
        let now = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or_default();
        let raw = RawSearchScope {
            trace_id: Some("t1".to_owned()),
            ..RawSearchScope::default()
        };

        let request = FilterArgs::default().request(raw, now);

        assert!(matches!(
            request,
            Ok(request) if matches!(request.scope, SearchScope::Trace(_))
        ));
    }
}
