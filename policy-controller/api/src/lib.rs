#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod dataplane;
pub mod duration;
pub mod external_service;
pub mod mesh;
pub mod policy;
pub mod registry;
pub mod resource;
pub mod store;
pub mod tags;
pub mod zone;

pub use self::{
    dataplane::{Dataplane, InboundInterface, OutboundInterface},
    external_service::ExternalService,
    mesh::Mesh,
    registry::{Descriptor, PolicyShape, Registry, Scope},
    resource::{AnyResource, Resource, ResourceKind, ResourceMeta, ResourceSpec},
    store::{MemoryStore, ReadOnlyResourceManager, StoreError},
    tags::{Selector, TagSelectorRank, TagSet},
    zone::{ZoneEgress, ZoneIngress},
};
