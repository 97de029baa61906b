//! Concrete resource models for the engine API.
//!
//! Each model pairs a server-assigned `id` with a parameter struct holding
//! the writable fields. The parameter struct is flattened into the model on
//! the wire, so the body of a write is exactly the parameters and the body
//! of a read is the parameters plus `id`.

use crate::model::{decode_replace, Resource, ResourceModel, Uploadable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A physical or logical asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub params: AssetParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Resource for Asset {
    const PATH: &'static str = "v1/engine/asset/assets/";

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        decode_replace(self, body)
    }
}

impl ResourceModel for Asset {
    type Params = AssetParams;

    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> &AssetParams {
        &self.params
    }
}

/// A component installed on an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub params: ComponentParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentParams {
    pub name: String,
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
}

impl Resource for Component {
    const PATH: &'static str = "v1/engine/asset/components/";

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        decode_replace(self, body)
    }
}

impl ResourceModel for Component {
    type Params = ComponentParams;

    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> &ComponentParams {
        &self.params
    }
}

/// An alert raised against an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub params: AlertParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertParams {
    pub name: String,
    pub asset: String,
    /// Severity, e.g. `critical` or `warning`.
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Resource for Alert {
    const PATH: &'static str = "v1/engine/alert/alerts/";

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        decode_replace(self, body)
    }
}

impl ResourceModel for Alert {
    type Params = AlertParams;

    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> &AlertParams {
        &self.params
    }
}

/// A dashboard grouping panels over assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub params: DashboardParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardParams {
    pub name: String,
    #[serde(default)]
    pub panels: Vec<serde_json::Value>,
}

impl Resource for Dashboard {
    const PATH: &'static str = "v1/engine/dashboard/dashboards/";

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        decode_replace(self, body)
    }
}

impl ResourceModel for Dashboard {
    type Params = DashboardParams;

    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> &DashboardParams {
        &self.params
    }
}

/// A file whose metadata lives in the engine and whose content is uploaded
/// separately.
///
/// `local_path`, `uploaded` and `checksum` are never read from a model
/// response; they survive every decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub params: FileParams,
    #[serde(skip)]
    pub local_path: PathBuf,
    #[serde(skip)]
    pub uploaded: bool,
    #[serde(skip)]
    pub checksum: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl File {
    /// A file that has not been created yet.
    pub fn new(params: FileParams, local_path: impl Into<PathBuf>) -> Self {
        Self {
            params,
            local_path: local_path.into(),
            ..Self::default()
        }
    }
}

impl Resource for File {
    const PATH: &'static str = "v1/engine/file/files/";

    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        let remote: File = serde_json::from_slice(body)?;
        self.id = remote.id;
        self.params = remote.params;
        Ok(())
    }

    fn as_uploadable(&mut self) -> Option<&mut dyn Uploadable> {
        Some(self)
    }
}

impl ResourceModel for File {
    type Params = FileParams;

    fn id(&self) -> &str {
        &self.id
    }

    fn params(&self) -> &FileParams {
        &self.params
    }
}

impl Uploadable for File {
    fn local_path(&self) -> &Path {
        &self.local_path
    }

    fn uploaded(&self) -> bool {
        self.uploaded
    }

    fn set_uploaded(&mut self, uploaded: bool) {
        self.uploaded = uploaded;
    }

    fn checksum(&self) -> &str {
        &self.checksum
    }

    fn set_checksum(&mut self, checksum: String) {
        self.checksum = checksum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_sent_without_identity() {
        let asset = Asset {
            id: "ast_1".to_string(),
            params: AssetParams {
                name: "pump-7".to_string(),
                description: None,
                asset_type: Some("pump".to_string()),
                labels: BTreeMap::new(),
            },
        };

        let body = serde_json::to_value(asset.params()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "name": "pump-7", "asset_type": "pump" })
        );
    }

    #[test]
    fn file_decode_keeps_local_state() {
        let mut file = File::new(
            FileParams {
                name: "manual.pdf".to_string(),
                ..FileParams::default()
            },
            "/tmp/manual.pdf",
        );
        file.uploaded = true;
        file.checksum = "abc".to_string();

        file.decode(br#"{"id": "fil_9", "name": "manual.pdf", "asset": "ast_1"}"#)
            .unwrap();

        assert_eq!(file.id, "fil_9");
        assert_eq!(file.params.asset.as_deref(), Some("ast_1"));
        assert_eq!(file.local_path, PathBuf::from("/tmp/manual.pdf"));
        assert!(file.uploaded);
        assert_eq!(file.checksum, "abc");
        assert!(file.as_uploadable().is_some());
    }

    #[test]
    fn plain_models_are_not_uploadable() {
        assert!(Asset::default().as_uploadable().is_none());
        assert!(Alert::default().as_uploadable().is_none());
    }
}
