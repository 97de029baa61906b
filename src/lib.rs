//! # Resync - resource synchronization for declarative providers
//!
//! Resync saves, retrieves, lists and deletes typed resource models on a
//! remote engine API. It is the HTTP core of an infrastructure-as-code
//! provider: the provider host decides *what* to create, update or delete,
//! and hands already-validated model structs to this crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use resync::{Client, ClientConfig, Listing, models::{Alert, Asset, AssetParams}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), resync::Error> {
//!     let client = Client::from_config(ClientConfig::new("api.example.com", "secret"))?;
//!
//!     // Create: empty id means POST to the collection
//!     let mut asset = Asset {
//!         params: AssetParams {
//!             name: "pump-7".to_string(),
//!             ..AssetParams::default()
//!         },
//!         ..Asset::default()
//!     };
//!     client.save(&mut asset).await?;
//!
//!     // Update: non-empty id means PATCH to the item
//!     asset.params.description = Some("north wing".to_string());
//!     client.save(&mut asset).await?;
//!
//!     let mut alerts = Listing::<Alert>::default();
//!     client.list(&mut alerts).await?;
//!
//!     client.delete(&asset, &asset.id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Status contract
//!
//! GET and PATCH expect 200, POST expects 201 and DELETE expects 204. Any
//! other status is an [`Error::HttpError`] carrying the code and the raw
//! body. Only 503 is retried, up to three attempts with waits of 2s and 4s;
//! running out of attempts yields [`Error::RetriesExhausted`], reported with
//! status 408.
//!
//! ## File resources
//!
//! Models that expose [`Uploadable`] through [`Resource::as_uploadable`]
//! have their local content uploaded on the first successful save:
//!
//! 1. fetch a signed upload URL,
//! 2. `PUT` the file to it,
//! 3. fetch the server-computed checksum and store it on the model.
//!
//! A failure in any step returns [`Error::Upload`]; the metadata record
//! created by the save is left on the server.

mod client;
mod config;
mod error;
pub mod metadata;
pub mod model;
pub mod models;
mod resource;
mod response;
pub mod retry;
mod upload;

pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{Error, Result, UploadStage};
pub use model::{Listing, Resource, ResourceModel, Uploadable};
pub use resource::Payload;
pub use response::Response;
pub use retry::{RetryPolicy, RetryPredicate};
pub use upload::unescape_checksum;
