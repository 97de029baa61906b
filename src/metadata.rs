//! Request envelope and the per-method status contract.

use http::{Method, StatusCode};
use serde::Serialize;

/// Everything needed to send one logical request.
///
/// An envelope is built fresh for every call and never reused.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, PATCH, DELETE).
    pub method: Method,

    /// The resource path, relative to the client's host.
    pub path: String,

    /// JSON-encoded request body; empty when the request carries none.
    pub body: Vec<u8>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path and no
    /// body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Vec::new(),
        }
    }

    /// Attaches a JSON-encoded body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SerializationFailed`] if `body` cannot be
    /// encoded.
    pub fn with_json<T>(mut self, body: &T) -> Result<Self, crate::Error>
    where
        T: Serialize + ?Sized,
    {
        self.body = serde_json::to_vec(body)
            .map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;
        Ok(self)
    }

    /// The status code that marks this request as successful.
    pub fn expected_status(&self) -> Option<StatusCode> {
        expected_status(&self.method)
    }
}

/// Returns the only status code accepted for `method`.
///
/// GET and PATCH expect 200, POST expects 201 and DELETE expects 204. Any
/// other method is not part of the contract.
pub fn expected_status(method: &Method) -> Option<StatusCode> {
    match *method {
        Method::GET | Method::PATCH => Some(StatusCode::OK),
        Method::POST => Some(StatusCode::CREATED),
        Method::DELETE => Some(StatusCode::NO_CONTENT),
        _ => None,
    }
}

/// Path of a single item beneath a collection path: `{collection}{id}/`.
pub fn item_path(collection: &str, id: &str) -> String {
    if collection.ends_with('/') {
        format!("{collection}{id}/")
    } else {
        format!("{collection}/{id}/")
    }
}
