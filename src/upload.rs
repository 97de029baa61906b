//! Content upload for file-backed resources.
//!
//! After the metadata record of a file exists, its content is committed in
//! three steps:
//!
//! 1. `GET {path}{id}/upload_url/` returns a signed, time-limited URL.
//! 2. The local file is streamed to that URL with `PUT`. This request goes
//!    straight to the storage backend: no retry, no auth header.
//! 3. `GET {path}{id}/details` returns the checksum the server computed,
//!    quoted once more as a string literal.

use crate::{
    error::UploadStage, metadata::item_path, model::Uploadable, Client, Error, Result,
};
use http::{header, StatusCode};
use std::path::Path;
use tokio_util::io::ReaderStream;
use url::Url;

/// Key of the signed URL in the upload-url response.
const UPLOAD_URL_FIELD: &str = "upload_url";

/// Key of the checksum in the details response.
const CHECKSUM_FIELD: &str = "checksum";

impl Client {
    /// Runs the upload sequence for the already-created record `id`.
    ///
    /// The uploaded flag is only set once every step succeeded.
    pub(crate) async fn upload_file(
        &self,
        collection: &str,
        id: &str,
        file: &mut dyn Uploadable,
    ) -> Result<()> {
        let url = self
            .fetch_upload_url(collection, id)
            .await
            .map_err(|e| upload_error(id, UploadStage::UploadUrl, e))?;

        let local = file.local_path().to_path_buf();
        self.put_content(&url, &local)
            .await
            .map_err(|e| upload_error(id, UploadStage::Transfer, e))?;

        let checksum = self
            .fetch_checksum(collection, id)
            .await
            .map_err(|e| upload_error(id, UploadStage::Checksum, e))?;

        tracing::info!(id = id, checksum = %checksum, "File content uploaded");
        file.set_checksum(checksum);
        file.set_uploaded(true);
        Ok(())
    }

    async fn fetch_upload_url(&self, collection: &str, id: &str) -> Result<Url> {
        let path = format!("{}upload_url/", item_path(collection, id));
        let payload = self.fetch_map(path).await?;
        Ok(Url::parse(payload.required_str(UPLOAD_URL_FIELD)?)?)
    }

    /// Streams the file at `local` to the signed `url`.
    async fn put_content(&self, url: &Url, local: &Path) -> Result<()> {
        let io_error = |source: std::io::Error| Error::Io {
            path: local.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(local).await.map_err(io_error)?;
        let length = file.metadata().await.map_err(io_error)?.len();

        tracing::debug!(
            path = %local.display(),
            length = length,
            "Uploading file content"
        );

        let response = self
            .http_client()
            .put(url.clone())
            .header(header::CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let mut message = format!("PUT upload expected {}", StatusCode::OK);
            let raw_response = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    message.push_str(&format!(" (failed to read response body: {})", e));
                    String::new()
                }
            };
            return Err(Error::HttpError {
                status,
                raw_response,
                message,
            });
        }

        Ok(())
    }

    /// Fetches and unescapes the server-computed checksum of `id`.
    pub(crate) async fn fetch_checksum(&self, collection: &str, id: &str) -> Result<String> {
        let path = format!("{}details", item_path(collection, id));
        let payload = self.fetch_map(path).await?;
        let quoted = payload.required_str(CHECKSUM_FIELD)?;
        unescape_checksum(quoted).map_err(|e| Error::DeserializationFailed {
            raw_response: payload.raw().to_string(),
            serde_error: e.to_string(),
            status: StatusCode::OK,
        })
    }
}

fn upload_error(id: &str, stage: UploadStage, source: Error) -> Error {
    tracing::error!(
        id = id,
        stage = %stage,
        error = %source,
        "File upload failed; metadata record left in place"
    );
    Error::Upload {
        id: id.to_string(),
        stage,
        source: Box::new(source),
    }
}

/// Removes one level of string-literal quoting from a checksum.
///
/// Storage backends report checksums the way they appear in an `ETag`
/// header, wrapped in double quotes. A value without surrounding quotes is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use resync::unescape_checksum;
///
/// assert_eq!(unescape_checksum("\"abc123\"").unwrap(), "abc123");
/// assert_eq!(unescape_checksum("abc123").unwrap(), "abc123");
/// ```
pub fn unescape_checksum(raw: &str) -> serde_json::Result<String> {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        serde_json::from_str(raw)
    } else {
        Ok(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_exactly_one_level_of_quoting() {
        assert_eq!(unescape_checksum("\"abc123\"").unwrap(), "abc123");
        assert_eq!(
            unescape_checksum(r#""\"abc123\"""#).unwrap(),
            "\"abc123\""
        );
        assert_eq!(
            unescape_checksum(r#""d41d8cd9-2""#).unwrap(),
            "d41d8cd9-2"
        );
    }

    #[test]
    fn unquoted_values_pass_through() {
        assert_eq!(unescape_checksum(" abc123 ").unwrap(), "abc123");
        assert_eq!(unescape_checksum("\"").unwrap(), "\"");
    }

    #[test]
    fn broken_escapes_are_errors() {
        assert!(unescape_checksum(r#""abc\q""#).is_err());
    }
}
