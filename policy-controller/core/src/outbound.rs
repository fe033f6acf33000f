use mesh_policy_controller_api::{Selector, TagSet};
use serde::Serialize;
use std::{collections::BTreeMap, net::IpAddr};

pub type ServiceName = String;

/// Endpoints of each service, in the order they were discovered.
pub type EndpointMap = BTreeMap<ServiceName, Vec<Endpoint>>;

/// The selectors an outbound may route to, keyed by service.
pub type DestinationMap = BTreeMap<ServiceName, TagSelectorSet>;

/// Endpoints in the local zone.
pub const PRIORITY_LOCAL: u32 = 0;

/// Endpoints reached through another zone or outside the mesh.
pub const PRIORITY_REMOTE: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub target: String,
    pub port: u16,
    pub tags: TagSet,
    pub weight: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<Locality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_service: Option<ExternalServiceInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    pub region: String,
    pub zone: String,
    pub sub_zone: String,
    pub priority: u32,
}

/// Marks an endpoint that lies outside the mesh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalServiceInfo {
    pub tls_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// An ordered set of selectors without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSelectorSet(Vec<Selector>);

/// The DNS names a virtual address is known by.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VipDomains {
    pub address: IpAddr,
    pub domains: Vec<String>,
}

// === impl Endpoint ===

impl Endpoint {
    pub fn is_external(&self) -> bool {
        self.external_service.is_some()
    }
}

// === impl TagSelectorSet ===

impl TagSelectorSet {
    /// Adds a selector unless an equal one is already present.
    pub fn add(&mut self, selector: Selector) {
        if !self.0.contains(&selector) {
            self.0.push(selector);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Selector> for TagSelectorSet {
    fn from_iter<T: IntoIterator<Item = Selector>>(iter: T) -> Self {
        let mut set = Self::default();
        for selector in iter {
            set.add(selector);
        }
        set
    }
}

impl<'s> IntoIterator for &'s TagSelectorSet {
    type Item = &'s Selector;
    type IntoIter = std::slice::Iter<'s, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
