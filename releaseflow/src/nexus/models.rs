//! Nexus search API response models.

use serde::{Deserialize, Serialize};

/// Response of `GET /search`.
///
/// Items come back in the order the query asked for; every query this
/// crate sends sorts by version, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusSearchResult {
    /// Matching components.
    #[serde(default)]
    pub items: Vec<NexusComponent>,
    /// Paging token; not followed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl NexusSearchResult {
    /// Creates a result from items.
    #[must_use]
    pub fn new(items: Vec<NexusComponent>) -> Self {
        Self {
            items,
            continuation_token: None,
        }
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Version of the first (newest) item.
    #[must_use]
    pub fn first_version(&self) -> Option<&str> {
        self.items.first().map(|item| item.version.as_str())
    }

    /// All versions, in result order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.version.as_str())
    }
}

/// A component stored in Nexus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusComponent {
    /// Component id.
    #[serde(default)]
    pub id: String,
    /// Repository holding the component.
    #[serde(default)]
    pub repository: String,
    /// Repository format (`maven2`, `npm`, `docker`).
    #[serde(default)]
    pub format: String,
    /// Group; absent for Docker images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Component name.
    pub name: String,
    /// Component version.
    pub version: String,
    /// Files belonging to the component.
    #[serde(default)]
    pub assets: Vec<NexusAsset>,
}

impl NexusComponent {
    /// Creates a component with just a name and version.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

/// A single file of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusAsset {
    /// Direct download URL.
    pub download_url: String,
    /// Path inside the repository.
    #[serde(default)]
    pub path: String,
    /// Asset id.
    #[serde(default)]
    pub id: String,
}
