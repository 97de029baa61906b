//! Error types for resource synchronization calls.
//!
//! Every failure path in the crate surfaces as an [`Error`]. Errors that came
//! from the remote server keep the status code and raw body so the
//! orchestration host can report exactly what the platform answered.

use http::StatusCode;
use std::path::PathBuf;

/// The main error type for the client.
///
/// # Examples
///
/// ```no_run
/// use resync::{Client, Error, models::Asset};
///
/// # async fn example(client: Client) -> Result<(), Error> {
/// let mut asset = Asset::default();
/// match client.retrieve(&mut asset, "ast_123").await {
///     Ok(()) => println!("asset {}", asset.params.name),
///     Err(Error::HttpError { status, raw_response, .. }) => {
///         eprintln!("HTTP error {}: {}", status, raw_response);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request or client could not be constructed (bad header value,
    /// missing host or token, unsupported method).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The host or a resource path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A network-level error occurred (connection refused, DNS, timeout,
    /// body read failure).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a status other than the one the method
    /// expects.
    #[error("HTTP error {status}: {message}: {raw_response}")]
    HttpError {
        /// The status code the server returned
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// Human-readable summary of what was expected
        message: String,
    },

    /// Every attempt ended in a transient failure.
    ///
    /// Reported with status 408: from the client's point of view the
    /// operation itself timed out.
    #[error("request timed out after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// The number of attempts made
        attempts: usize,
        /// The error returned by the final attempt
        last_error: Box<Error>,
    },

    /// The response body did not match the expected shape.
    #[error("error decoding model (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to serialize a model's parameters.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An untyped payload lacked a required key, or the key had the wrong
    /// type.
    #[error("response is missing string field `{field}`: {raw_response}")]
    MissingField {
        /// The key that was looked up
        field: &'static str,
        /// The raw response body
        raw_response: String,
    },

    /// A local file could not be opened or inspected.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The local path involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A step of the file upload sequence failed after the metadata record
    /// was created.
    ///
    /// The record identified by `id` still exists on the server.
    #[error("file upload for {id} failed during {stage}: {source}")]
    Upload {
        /// Identity of the already-created metadata record
        id: String,
        /// Which step failed
        stage: UploadStage,
        /// What went wrong
        source: Box<Error>,
    },
}

/// The steps of the file upload sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Fetching the signed upload URL
    UploadUrl,
    /// Sending the file contents to the signed URL
    Transfer,
    /// Fetching the server-computed checksum
    Checksum,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            UploadStage::UploadUrl => "upload URL fetch",
            UploadStage::Transfer => "content transfer",
            UploadStage::Checksum => "checksum fetch",
        };
        f.write_str(stage)
    }
}

impl Error {
    /// Returns `true` if this error is a transient failure.
    ///
    /// Only 503 Service Unavailable qualifies. Everything else, including
    /// network errors and other 5xx codes, is terminal.
    ///
    /// # Examples
    ///
    /// ```
    /// use resync::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     raw_response: "busy".to_string(),
    ///     message: "expected 200 OK".to_string(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::INTERNAL_SERVER_ERROR,
    ///     raw_response: "boom".to_string(),
    ///     message: "expected 200 OK".to_string(),
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::HttpError { status, .. } if *status == StatusCode::SERVICE_UNAVAILABLE
        )
    }

    /// Returns the status code associated with this error.
    ///
    /// Retry exhaustion reports 408 Request Timeout. Upload failures report
    /// the status of the step that failed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::RetriesExhausted { .. } => Some(StatusCode::REQUEST_TIMEOUT),
            Error::Upload { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            Error::MissingField { raw_response, .. } => Some(raw_response),
            Error::RetriesExhausted { last_error, .. } => last_error.raw_response(),
            Error::Upload { source, .. } => source.raw_response(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for client calls.
pub type Result<T> = std::result::Result<T, Error>;
