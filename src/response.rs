//! Buffered response returned by a successful exchange.
//!
//! The [`Response`] type holds the fully-read body along with metadata about
//! the HTTP transaction. The body can be read as many times as needed.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::io::Cursor;
use std::time::Duration;

use crate::{Error, Result};

/// A successful HTTP response with its body held in memory.
#[derive(Debug, Clone)]
pub struct Response {
    /// The raw response body.
    pub body: Vec<u8>,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The total latency of the request, including all retry attempts.
    pub latency: Duration,

    /// The number of attempts made to complete this request.
    pub attempts: usize,
}

impl Response {
    /// Creates a new `Response`.
    pub fn new(
        body: Vec<u8>,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Returns a fresh reader positioned at the start of the body.
    ///
    /// # Examples
    ///
    /// ```
    /// # use resync::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::io::Read;
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     b"{}".to_vec(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(5),
    ///     1,
    /// );
    ///
    /// let mut first = String::new();
    /// response.reader().read_to_string(&mut first).unwrap();
    /// let mut second = String::new();
    /// response.reader().read_to_string(&mut second).unwrap();
    /// assert_eq!(first, second);
    /// ```
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.body.as_slice())
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the raw body attached if
    /// the body does not match `T`.
    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(&self.body).map_err(|e| self.decode_error(e))
    }

    /// Wraps a serde failure on this body with context.
    pub(crate) fn decode_error(&self, error: serde_json::Error) -> Error {
        let raw_response = self.text();
        tracing::error!(
            error = %error,
            raw_response = %raw_response,
            "Failed to deserialize response"
        );
        Error::DeserializationFailed {
            raw_response,
            serde_error: error.to_string(),
            status: self.status,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> Response {
        Response::new(
            body.as_bytes().to_vec(),
            StatusCode::OK,
            HeaderMap::new(),
            Duration::from_millis(1),
            1,
        )
    }

    #[test]
    fn decode_failure_keeps_raw_body() {
        let err = response("not json").json::<serde_json::Value>().unwrap_err();
        match err {
            Error::DeserializationFailed {
                raw_response,
                status,
                ..
            } => {
                assert_eq!(raw_response, "not json");
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
        assert!(response("[]")
            .json::<serde_json::Value>()
            .unwrap()
            .is_array());
    }

    #[test]
    fn reader_restarts_at_the_beginning() {
        use std::io::Read;

        let response = response(r#"{"checksum": "abc"}"#);
        let mut first = Vec::new();
        response.reader().read_to_end(&mut first).unwrap();

        let mut reader = response.reader();
        let mut prefix = [0u8; 1];
        reader.read_exact(&mut prefix).unwrap();
        assert_eq!(&prefix, b"{");

        let value: serde_json::Value = serde_json::from_reader(response.reader()).unwrap();
        assert_eq!(value["checksum"], "abc");
        assert_eq!(first, response.body);
    }
}
