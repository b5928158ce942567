use std::time::Duration;

use obsq_application::DEFAULT_ALERT_DESTINATION;
use obsq_core::{AppError, AppResult};
use obsq_infrastructure::{DEFAULT_REQUEST_TIMEOUT, OpenObserveConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_ORGANIZATION: &str = "default";
const DEFAULT_STREAM: &str = "default";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub openobserve: OpenObserveConfig,
    pub logs_stream: String,
    pub traces_stream: String,
    pub alert_destination: String,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required_var(&lookup, "OPENOBSERVE_URL")?
            .trim_end_matches('/')
            .to_owned();
        let organization = optional_var(&lookup, "OPENOBSERVE_ORG", DEFAULT_ORGANIZATION);
        let username = required_var(&lookup, "OPENOBSERVE_USER")?;
        let token = required_var(&lookup, "OPENOBSERVE_TOKEN")?;
        let logs_stream = optional_var(&lookup, "OPENOBSERVE_LOGS_STREAM", DEFAULT_STREAM);
        let traces_stream = optional_var(&lookup, "OPENOBSERVE_TRACES_STREAM", DEFAULT_STREAM);
        let alert_destination = optional_var(
            &lookup,
            "OPENOBSERVE_ALERT_DESTINATION",
            DEFAULT_ALERT_DESTINATION,
        );

        let timeout_seconds = match lookup("OPENOBSERVE_TIMEOUT_SECONDS") {
            Some(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid OPENOBSERVE_TIMEOUT_SECONDS value '{value}': {error}"
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT.as_secs(),
        };
        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "OPENOBSERVE_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            openobserve: OpenObserveConfig::new(base_url, organization, username, token)
                .with_request_timeout(Duration::from_secs(timeout_seconds)),
            logs_stream,
            traces_stream,
            alert_destination,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn required_var<F>(lookup: &F, name: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_var<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
