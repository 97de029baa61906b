//! HTTP client with bounded retry and a strict status-code contract.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to
//! configure and create clients. A single exchange is performed by the
//! transport layer (`send_once`); [`Client::call`] wraps it with the retry
//! policy.

use crate::{
    config::{ClientConfig, DEFAULT_TIMEOUT},
    metadata::RequestMetadata,
    retry::{RetryOnServiceUnavailable, RetryPolicy, RetryPredicate},
    Error, Response, Result,
};
use http::{header, HeaderValue};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A client for one remote platform host.
///
/// The client is immutable after construction and cheap to clone; clones
/// share the connection pool. Concurrent calls are independent: each builds
/// its own request and response.
///
/// # Examples
///
/// ```no_run
/// use resync::{Client, models::Asset};
///
/// # async fn example() -> Result<(), resync::Error> {
/// let client = Client::builder()
///     .host("api.example.com")
///     .token("secret")
///     .user_agent_extra("terraform", "1.9.0")
///     .build()?;
///
/// let mut asset = Asset::default();
/// asset.params.name = "pump-7".to_string();
/// client.save(&mut asset).await?;
/// println!("created {}", asset.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    authorization: HeaderValue,
    user_agent: HeaderValue,
    retry_policy: RetryPolicy,
    retry_predicate: Box<dyn RetryPredicate>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("user_agent", &self.inner.user_agent)
            .field("retry_policy", &self.inner.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from a configuration with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or token are invalid.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    /// The base URL every resource path is joined to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The user agent sent with every request.
    pub fn user_agent(&self) -> &str {
        self.inner.user_agent.to_str().unwrap_or_default()
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.inner.http_client
    }

    /// Sends one logical request, retrying transient failures.
    ///
    /// The request is attempted until it succeeds, fails with an error the
    /// retry predicate rejects, or runs out of attempts. Exhaustion is
    /// reported as [`Error::RetriesExhausted`], which carries status 408 and
    /// the last underlying error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use resync::{Client, metadata::RequestMetadata};
    /// use http::Method;
    ///
    /// # async fn example(client: Client) -> Result<(), resync::Error> {
    /// let metadata = RequestMetadata::new(Method::GET, "v1/engine/alert/levels/");
    /// let response = client.call(metadata).await?;
    /// println!("{} after {} attempts", response.text(), response.attempts);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call(&self, metadata: RequestMetadata) -> Result<Response> {
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.send_once(&metadata, attempt, start_time).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                method = %metadata.method,
                path = %metadata.path,
                "Request failed"
            );

            if !self.inner.retry_predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            match self.inner.retry_policy.delay_for_attempt(attempt) {
                Some(delay) => {
                    tracing::info!(
                        delay_ms = delay.as_millis(),
                        attempt = attempt,
                        "Retrying request after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(Error::RetriesExhausted {
                        attempts: attempt,
                        last_error: Box::new(error),
                    });
                }
            }
        }
    }

    /// Performs exactly one exchange and classifies the outcome.
    async fn send_once(
        &self,
        metadata: &RequestMetadata,
        attempt: usize,
        start_time: Instant,
    ) -> Result<Response> {
        // Each method has exactly one success code
        let expected = metadata.expected_status().ok_or_else(|| {
            Error::ConfigurationError(format!("Unsupported method: {}", metadata.method))
        })?;
        // Build the full URL
        let url = self
            .inner
            .base_url
            .join(metadata.path.trim_start_matches('/'))?;

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            attempt = attempt,
            body = %String::from_utf8_lossy(&metadata.body),
            "Executing HTTP request"
        );

        // Build the request with auth and user agent
        let mut request = self
            .inner
            .http_client
            .request(metadata.method.clone(), url)
            .header(header::AUTHORIZATION, self.inner.authorization.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, self.inner.user_agent.clone());

        // Add body if provided
        if !metadata.body.is_empty() {
            request = request.body(metadata.body.clone());
        }

        let request = request
            .build()
            .map_err(|e| Error::ConfigurationError(format!("Failed to build request: {}", e)))?;

        // Read the whole body before classifying
        let response = self.inner.http_client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        let latency = start_time.elapsed();

        tracing::debug!(
            status = status.as_u16(),
            attempt = attempt,
            latency_ms = latency.as_millis(),
            body = %String::from_utf8_lossy(&body),
            "Received HTTP response"
        );

        if status != expected {
            let raw_response = String::from_utf8_lossy(&body).into_owned();

            // Log based on status category
            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %raw_response,
                    "Client error (4xx)"
                );
            } else if status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %raw_response,
                    "Server error (5xx)"
                );
            }

            return Err(Error::HttpError {
                status,
                raw_response,
                message: format!(
                    "{} {} expected {}",
                    metadata.method, metadata.path, expected
                ),
            });
        }

        Ok(Response::new(body, status, headers, latency, attempt))
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use resync::{ClientBuilder, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), resync::Error> {
/// let client = ClientBuilder::new()
///     .host("https://api.example.com")
///     .token("secret")
///     .timeout(Duration::from_secs(30))
///     .retry_policy(RetryPolicy {
///         max_attempts: 5,
///         initial_delay: Duration::from_millis(500),
///         multiplier: 2,
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    timeout: Option<Duration>,
    retry_policy: RetryPolicy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::from_config(ClientConfig::new("", ""))
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            timeout: None,
            retry_policy: RetryPolicy::default(),
            retry_predicate: None,
        }
    }

    /// Sets the remote host. A missing scheme defaults to `https://`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Sets the per-request timeout. Defaults to 60 seconds.
    ///
    /// Takes precedence over `timeout_secs` of the configuration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the product name and version at the head of the user agent.
    pub fn product(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.product = name.into();
        self.config.version = version.into();
        self
    }

    /// Appends a `key=value` pair to the user agent.
    pub fn user_agent_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .user_agent_extras
            .push((key.into(), value.into()));
        self
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default only 503 responses are retried.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or token are missing or invalid.
    pub fn build(self) -> Result<Client> {
        let base_url = self.config.base_url()?;

        if self.config.token.trim().is_empty() {
            return Err(Error::ConfigurationError("Token is required".to_string()));
        }

        let mut authorization = HeaderValue::try_from(self.config.authorization())
            .map_err(|e| Error::ConfigurationError(format!("Invalid token: {}", e)))?;
        authorization.set_sensitive(true);

        let user_agent = HeaderValue::try_from(self.config.user_agent())
            .map_err(|e| Error::ConfigurationError(format!("Invalid user agent: {}", e)))?;

        let timeout = match (self.timeout, self.config.timeout_secs) {
            (Some(timeout), _) if !timeout.is_zero() => timeout,
            (_, 0) => DEFAULT_TIMEOUT,
            _ => self.config.timeout(),
        };

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnServiceUnavailable));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                authorization,
                user_agent,
                retry_policy: self.retry_policy,
                retry_predicate,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
