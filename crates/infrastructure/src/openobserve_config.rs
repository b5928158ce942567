use std::fmt;
use std::time::Duration;

/// Per-call timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one OpenObserve organization.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenObserveConfig {
    /// Base URL of the OpenObserve API, without the `/api` suffix.
    pub base_url: String,
    /// Organization queries and alerts are scoped to.
    pub organization: String,
    /// Basic auth user.
    pub username: String,
    /// Basic auth password or token.
    pub token: String,
    /// Upper bound on one backend call.
    pub request_timeout: Duration,
}

impl OpenObserveConfig {
    /// Creates a configuration with the default request timeout.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            organization: organization.into(),
            username: username.into(),
            token: token.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl fmt::Debug for OpenObserveConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OpenObserveConfig")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{DEFAULT_REQUEST_TIMEOUT, OpenObserveConfig};

    #[test]
    fn debug_output_hides_the_token() {
        let config = OpenObserveConfig::new("http://localhost:5080", "default", "ops", "s3cret");

        let rendered = format!("{config:?}");

        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("ops"));
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let config = OpenObserveConfig::new("http://localhost:5080", "default", "ops", "t");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);

        let config = config.with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
