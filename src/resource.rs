//! Generic save, retrieve, list and delete over any resource model.

use crate::{
    metadata::{item_path, RequestMetadata},
    model::{Resource, ResourceModel},
    Client, Error, Response, Result,
};
use http::Method;
use serde_json::{Map, Value};

impl Client {
    /// Creates or updates `model` on the server.
    ///
    /// A model with an empty identity is created with `POST {path}`; any
    /// other model is updated with `PATCH {path}{id}/`. The body is the
    /// model's parameter projection. The response is decoded back into
    /// `model`, so the server-assigned identity and derived fields become
    /// visible to the caller.
    ///
    /// File-backed models that have not uploaded their content yet go
    /// through the upload sequence before this returns. If that sequence
    /// fails the metadata record stays on the server and the error is
    /// [`Error::Upload`], naming the record's id; `model.id()` is already
    /// set, so the caller can delete or retry.
    pub async fn save<M>(&self, model: &mut M) -> Result<()>
    where
        M: ResourceModel,
    {
        let (method, path) = if model.id().is_empty() {
            (Method::POST, model.path().to_string())
        } else {
            (Method::PATCH, item_path(model.path(), model.id()))
        };
        let metadata = RequestMetadata::new(method, path).with_json(model.params())?;

        let response = self.call(metadata).await?;
        decode_into(model, &response)?;

        let id = model.id().to_string();
        let collection = model.path().to_string();
        if let Some(file) = model.as_uploadable() {
            if !file.uploaded() {
                if id.is_empty() {
                    return Err(Error::MissingField {
                        field: "id",
                        raw_response: response.text(),
                    });
                }
                self.upload_file(&collection, &id, file).await?;
            }
        }

        Ok(())
    }

    /// Reads the resource `id` into `model` with `GET {path}{id}/`.
    ///
    /// For file-backed models the checksum is refreshed as well, which costs
    /// one extra request. A checksum that differs from the one held before
    /// marks the local content as stale by clearing the uploaded flag.
    pub async fn retrieve<M>(&self, model: &mut M, id: &str) -> Result<()>
    where
        M: Resource,
    {
        let collection = model.path().to_string();
        let metadata = RequestMetadata::new(Method::GET, item_path(&collection, id));
        let response = self.call(metadata).await?;
        decode_into(model, &response)?;

        if let Some(file) = model.as_uploadable() {
            let checksum = self.fetch_checksum(&collection, id).await?;
            if !file.checksum().is_empty() && file.checksum() != checksum {
                tracing::warn!(
                    id = id,
                    previous = file.checksum(),
                    current = %checksum,
                    "Remote checksum changed; local content is stale"
                );
                file.set_uploaded(false);
            }
            file.set_checksum(checksum);
        }

        Ok(())
    }

    /// Reads a whole collection with `GET {path}`.
    ///
    /// The collection is not paginated; `model` is usually a
    /// [`Listing`](crate::Listing).
    pub async fn list<M>(&self, model: &mut M) -> Result<()>
    where
        M: Resource,
    {
        let metadata = RequestMetadata::new(Method::GET, model.path());
        let response = self.call(metadata).await?;
        decode_into(model, &response)
    }

    /// Deletes the resource `id` with `DELETE {path}{id}/`.
    ///
    /// Only 204 No Content counts as success.
    pub async fn delete<M>(&self, model: &M, id: &str) -> Result<()>
    where
        M: Resource,
    {
        let metadata = RequestMetadata::new(Method::DELETE, item_path(model.path(), id));
        self.call(metadata).await?;
        Ok(())
    }

    /// Reads a payload that is not a full model with `GET {path}`.
    pub async fn fetch_map(&self, path: impl Into<String>) -> Result<Payload> {
        let response = self.call(RequestMetadata::new(Method::GET, path)).await?;
        let map = response.json::<Map<String, Value>>()?;
        Ok(Payload {
            map,
            raw: response.text(),
        })
    }
}

fn decode_into<M>(model: &mut M, response: &Response) -> Result<()>
where
    M: Resource,
{
    model
        .decode(&response.body)
        .map_err(|e| response.decode_error(e))
}

/// An untyped JSON object, for single-purpose responses.
#[derive(Debug, Clone)]
pub struct Payload {
    /// The decoded object.
    pub map: Map<String, Value>,
    raw: String,
}

impl Payload {
    /// Returns the string stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the key is absent or not a string.
    pub fn required_str(&self, key: &'static str) -> Result<&str> {
        self.map
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingField {
                field: key,
                raw_response: self.raw.clone(),
            })
    }

    /// The raw response body.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(raw: &str) -> Payload {
        Payload {
            map: serde_json::from_str(raw).unwrap(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn required_str_validates_presence_and_type() {
        let body = payload(r#"{"url": "https://bucket/x", "size": 3}"#);

        assert_eq!(body.required_str("url").unwrap(), "https://bucket/x");
        match body.required_str("size") {
            Err(Error::MissingField { field, raw_response }) => {
                assert_eq!(field, "size");
                assert!(raw_response.contains("bucket"));
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
        assert!(matches!(
            body.required_str("checksum"),
            Err(Error::MissingField { field: "checksum", .. })
        ));
    }
}
