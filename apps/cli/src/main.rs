//! obsq command line client.

#![forbid(unsafe_code)]

mod cli_args;
mod cli_config;

use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use obsq_application::{AlertRuleService, LogQueryService, TraceQueryService};
use obsq_core::{AppError, AppResult};
use obsq_domain::{RawSearchScope, SpanLookup};
use obsq_infrastructure::OpenObserveClient;

use crate::cli_args::{AlertsCommand, Cli, Command, LogsCommand, TracesCommand};
use crate::cli_config::{CliConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load()?;

    info!(
        base_url = %config.openobserve.base_url,
        organization = %config.openobserve.organization,
        "obsq starting"
    );

    let output = run(cli.command, &config).await?;
    println!("{output}");
    Ok(())
}

async fn run(command: Command, config: &CliConfig) -> AppResult<String> {
    let client = Arc::new(OpenObserveClient::new(config.openobserve.clone())?);
    let now = Utc::now();

    match command {
        Command::Logs { target } => {
            let service = LogQueryService::new(client, config.logs_stream.as_str());
            let request = match target {
                LogsCommand::Component { scope, filter } => {
                    filter.request(RawSearchScope::from(scope), now)?
                }
                LogsCommand::Workflow {
                    namespace,
                    workflow_run_name,
                    filter,
                } => filter.request(
                    RawSearchScope {
                        namespace: Some(namespace),
                        workflow_run_name: Some(workflow_run_name),
                        ..RawSearchScope::default()
                    },
                    now,
                )?,
            };

            render(&service.query_logs(&request).await?)
        }
        Command::Traces { target } => {
            let service = TraceQueryService::new(client, config.traces_stream.as_str());
            match target {
                TracesCommand::List { scope, filter } => {
                    let request = filter.request(RawSearchScope::from(scope), now)?;
                    render(&service.list_traces(&request).await?)
                }
                TracesCommand::Spans { trace_id, filter } => {
                    let request = filter.request(
                        RawSearchScope {
                            trace_id: Some(trace_id),
                            ..RawSearchScope::default()
                        },
                        now,
                    )?;
                    render(&service.list_spans(&request).await?)
                }
                TracesCommand::Span { trace_id, span_id } => {
                    let lookup = SpanLookup { trace_id, span_id };
                    render(&service.span_detail(&lookup).await?)
                }
            }
        }
        Command::Alerts { action } => {
            let service = AlertRuleService::new(
                client,
                config.logs_stream.as_str(),
                config.alert_destination.as_str(),
            );
            let result = match action {
                AlertsCommand::Create(rule) => service.create_rule(&rule.into()).await?,
                AlertsCommand::Update(rule) => service.update_rule(&rule.into()).await?,
                AlertsCommand::Delete { name } => service.delete_rule(name.as_str()).await?,
            };

            render(&result)
        }
    }
}

fn render<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to render output: {error}")))
}
