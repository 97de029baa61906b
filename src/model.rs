//! Capability traits implemented by resource models.
//!
//! The CRUD operations on [`Client`](crate::Client) only depend on these
//! traits, never on concrete model types:
//!
//! - [`Resource`] - has a collection path and can decode itself from a
//!   response body. Enough for retrieve, list and delete.
//! - [`ResourceModel`] - additionally has an identity and a parameter
//!   projection. Required for save.
//! - [`Uploadable`] - optional extra capability of file-backed resources,
//!   reached through [`Resource::as_uploadable`].

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

/// A typed entity that lives under a collection path.
pub trait Resource {
    /// Collection path, of the form `v{N}/engine/<domain>/<collection>/`.
    const PATH: &'static str;

    /// Path of the collection this instance belongs to.
    fn path(&self) -> &str {
        Self::PATH
    }

    /// Replaces the server-owned state of `self` with the decoded `body`.
    ///
    /// Fields that only exist locally must survive the call.
    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()>;

    /// Returns the upload capability if this resource is file-backed.
    fn as_uploadable(&mut self) -> Option<&mut dyn Uploadable> {
        None
    }
}

/// A resource that can be written.
pub trait ResourceModel: Resource {
    /// The fields sent on create and update.
    type Params: Serialize;

    /// Server-assigned identity. Empty until the resource is created.
    fn id(&self) -> &str;

    /// The parameter projection of this model.
    fn params(&self) -> &Self::Params;
}

/// A resource whose content is a local file uploaded after creation.
pub trait Uploadable: Send + Sync {
    /// The local file holding the content.
    fn local_path(&self) -> &Path;

    /// Whether this instance already uploaded its content.
    fn uploaded(&self) -> bool;

    /// Records that the content was uploaded.
    fn set_uploaded(&mut self, uploaded: bool);

    /// The server-computed checksum, empty until fetched.
    fn checksum(&self) -> &str;

    /// Stores a checksum fetched from the server.
    fn set_checksum(&mut self, checksum: String);
}

/// Replaces `target` with the value decoded from `body`.
///
/// Suitable for models whose every field comes from the server.
pub fn decode_replace<T>(target: &mut T, body: &[u8]) -> serde_json::Result<()>
where
    T: DeserializeOwned,
{
    *target = serde_json::from_slice(body)?;
    Ok(())
}

/// A `{"results": [...]}` envelope returned when listing a collection.
///
/// # Examples
///
/// ```no_run
/// use resync::{Client, Listing, models::Alert};
///
/// # async fn example(client: Client) -> Result<(), resync::Error> {
/// let mut alerts = Listing::<Alert>::default();
/// client.list(&mut alerts).await?;
/// for alert in &alerts.results {
///     println!("{} {}", alert.id, alert.params.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<M> {
    /// The items in the collection.
    pub results: Vec<M>,
}

impl<M> Default for Listing<M> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<M> Resource for Listing<M>
where
    M: Resource + DeserializeOwned,
{
    const PATH: &'static str = M::PATH;

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        decode_replace(self, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Level {
        id: String,
        name: String,
    }

    impl Resource for Level {
        const PATH: &'static str = "v1/engine/alert/levels/";

        fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
            decode_replace(self, body)
        }
    }

    #[test]
    fn listing_uses_item_path_and_results_envelope() {
        let mut listing = Listing::<Level>::default();
        assert_eq!(listing.path(), "v1/engine/alert/levels/");
        assert!(listing.as_uploadable().is_none());

        listing
            .decode(br#"{"results": [{"id": "1", "name": "critical"}]}"#)
            .unwrap();
        assert_eq!(
            listing.results,
            vec![Level {
                id: "1".to_string(),
                name: "critical".to_string()
            }]
        );
    }

    #[test]
    fn listing_rejects_bare_arrays() {
        let mut listing = Listing::<Level>::default();
        assert!(listing.decode(br#"[{"id": "1", "name": "x"}]"#).is_err());
    }
}
