//! Client configuration supplied by the provider host.

use serde::Deserialize;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for one provider configuration.
///
/// Loading this value (from a YAML workspace file, environment variables or
/// anything else) is up to the caller; the client only consumes it.
///
/// # Examples
///
/// ```
/// use resync::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{ "host": "api.example.com", "token": "secret" }"#,
/// ).unwrap();
///
/// assert_eq!(config.timeout_secs, 60);
/// assert_eq!(config.authorization(), "Bearer secret");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Remote host, with or without a scheme.
    pub host: String,

    /// Bearer token, with or without the `Bearer ` prefix.
    pub token: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Product name reported in the user agent.
    #[serde(default = "default_product")]
    pub product: String,

    /// Product version reported in the user agent.
    #[serde(default = "default_version")]
    pub version: String,

    /// Additional `key=value` pairs appended to the user agent, in order.
    #[serde(default)]
    pub user_agent_extras: Vec<(String, String)>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_product() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl ClientConfig {
    /// Creates a configuration with default timeout and user agent.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            timeout_secs: default_timeout_secs(),
            product: default_product(),
            version: default_version(),
            user_agent_extras: Vec::new(),
        }
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        if self.token.starts_with("Bearer ") {
            self.token.clone()
        } else {
            format!("Bearer {}", self.token)
        }
    }

    /// Builds `{product}/{version};os=..;arch=..;k1=v1;...`.
    pub fn user_agent(&self) -> String {
        let mut agent = format!("{}/{}", self.product, self.version);
        let facts = [
            ("os", std::env::consts::OS),
            ("arch", std::env::consts::ARCH),
        ];
        for (key, value) in facts {
            agent.push_str(&format!(";{key}={value}"));
        }
        for (key, value) in &self.user_agent_extras {
            agent.push_str(&format!(";{key}={value}"));
        }
        agent
    }

    /// The host as an absolute base URL ending in `/`.
    pub fn base_url(&self) -> Result<url::Url, crate::Error> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(crate::Error::ConfigurationError(
                "Host is required".to_string(),
            ));
        }

        let mut base = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(url::Url::parse(&base)?)
    }
}
