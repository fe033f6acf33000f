use crate::api::{AnyResource, MemoryStore, Registry, StoreError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};

/// A point-in-time dump of a control plane's resources.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub resources: Vec<AnyResource>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        let snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    /// Loads the snapshot's resources into a store. Fails on resources of
    /// unregistered kinds and on duplicates.
    pub fn into_store(self, registry: Arc<Registry>) -> Result<MemoryStore, StoreError> {
        let store = MemoryStore::new(registry);
        for resource in self.resources {
            store.create_any(resource)?;
        }
        Ok(store)
    }
}
