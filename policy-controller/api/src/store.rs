use crate::{
    registry::{Registry, Scope},
    resource::{AnyResource, Resource, ResourceKind, ResourceSpec},
};
use parking_lot::RwLock;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("resource type {0} is not registered")]
    UnknownKind(ResourceKind),

    #[error("{kind} {mesh}/{name} already exists")]
    AlreadyExists {
        kind: ResourceKind,
        mesh: String,
        name: String,
    },

    #[error("{kind} {mesh}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        mesh: String,
        name: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Lists resources for the controller.
///
/// Listings are ordered by mesh and then by name.
#[async_trait::async_trait]
pub trait ReadOnlyResourceManager: Send + Sync {
    /// Lists resources of type `S`. Mesh-scoped kinds are limited to `mesh`
    /// when it is set.
    async fn list<S: ResourceSpec>(
        &self,
        mesh: Option<&str>,
    ) -> Result<Vec<Resource<S>>, StoreError>;

    async fn get<S: ResourceSpec>(
        &self,
        mesh: &str,
        name: &str,
    ) -> Result<Resource<S>, StoreError> {
        self.list::<S>(Some(mesh))
            .await?
            .into_iter()
            .find(|r| r.meta.name == name && (r.meta.mesh == mesh || r.meta.mesh.is_empty()))
            .ok_or_else(|| StoreError::NotFound {
                kind: S::KIND,
                mesh: mesh.to_string(),
                name: name.to_string(),
            })
    }
}

/// Holds resources in memory.
#[derive(Debug)]
pub struct MemoryStore {
    registry: Arc<Registry>,
    resources: RwLock<BTreeMap<ResourceKind, BTreeMap<Key, AnyResource>>>,
}

type Key = (String, String);

// === impl MemoryStore ===

impl MemoryStore {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            resources: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn create<S: ResourceSpec>(&self, resource: Resource<S>) -> Result<(), StoreError> {
        self.create_any(S::into_any(resource))
    }

    pub fn create_any(&self, resource: AnyResource) -> Result<(), StoreError> {
        let kind = self.registered(resource.kind())?;
        let meta = resource.meta();
        let key = (meta.mesh.clone(), meta.name.clone());

        let mut resources = self.resources.write();
        let by_key = resources.entry(kind).or_default();
        if by_key.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                kind,
                mesh: key.0,
                name: key.1,
            });
        }
        tracing::debug!(%kind, mesh = %key.0, name = %key.1, "Created");
        by_key.insert(key, resource);
        Ok(())
    }

    pub fn delete(&self, kind: ResourceKind, mesh: &str, name: &str) -> Result<(), StoreError> {
        let kind = self.registered(kind)?;
        let key = (mesh.to_string(), name.to_string());
        let removed = self
            .resources
            .write()
            .get_mut(&kind)
            .and_then(|by_key| by_key.remove(&key));
        match removed {
            Some(_) => {
                tracing::debug!(%kind, mesh, name, "Deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind,
                mesh: key.0,
                name: key.1,
            }),
        }
    }

    fn registered(&self, kind: ResourceKind) -> Result<ResourceKind, StoreError> {
        if self.registry.contains(kind) {
            Ok(kind)
        } else {
            Err(StoreError::UnknownKind(kind))
        }
    }

    fn scope(&self, kind: ResourceKind) -> Scope {
        self.registry
            .descriptor(kind)
            .map(|d| d.scope)
            .unwrap_or(Scope::Mesh)
    }
}

#[async_trait::async_trait]
impl ReadOnlyResourceManager for MemoryStore {
    async fn list<S: ResourceSpec>(
        &self,
        mesh: Option<&str>,
    ) -> Result<Vec<Resource<S>>, StoreError> {
        let kind = self.registered(S::KIND)?;
        let mesh = match self.scope(kind) {
            Scope::Mesh => mesh,
            Scope::Global => None,
        };

        let resources = self.resources.read();
        let list = resources
            .get(&kind)
            .into_iter()
            .flat_map(|by_key| by_key.values())
            .filter(|r| mesh.map(|m| r.meta().mesh == m).unwrap_or(true))
            .filter_map(S::from_any)
            .cloned()
            .collect();
        Ok(list)
    }
}

#[async_trait::async_trait]
impl<T: ReadOnlyResourceManager> ReadOnlyResourceManager for Arc<T> {
    async fn list<S: ResourceSpec>(
        &self,
        mesh: Option<&str>,
    ) -> Result<Vec<Resource<S>>, StoreError> {
        (**self).list::<S>(mesh).await
    }
}
