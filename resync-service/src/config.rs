use crate::error::{ServiceError, ServiceResult};
use resync_events::CollectionSpec;
use resync_storage::StoreConfig;
use serde::{Deserialize, Serialize};

/// Setup of one resource class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Resource pattern, e.g. `library.book.$id`.
    pub pattern: String,
    /// Tag of `pattern` bound to the internal id.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Collections kept over this resource class.
    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_tag() -> String {
    "id".to_owned()
}

impl ServiceConfig {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            tag: default_tag(),
            collections: Vec::new(),
            store: StoreConfig::default(),
        }
    }

    #[must_use]
    pub fn with_collection(mut self, spec: CollectionSpec) -> Self {
        self.collections.push(spec);
        self
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> ServiceResult<Self> {
        serde_json::from_str(json).map_err(|e| ServiceError::Config(e.to_string()))
    }
}
