use crate::tags::TagSet;
use serde::{Deserialize, Serialize};

/// Exposes a zone's services to other zones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneIngress {
    /// Empty when the ingress belongs to the local zone.
    #[serde(default)]
    pub zone: String,
    pub networking: ZoneIngressNetworking,
    #[serde(default)]
    pub available_services: Vec<AvailableService>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneIngressNetworking {
    pub address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertised_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertised_port: Option<u16>,
}

/// Carries a zone's traffic to external services.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneEgress {
    #[serde(default)]
    pub zone: String,
    pub networking: ZoneEgressNetworking,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEgressNetworking {
    pub address: String,
    pub port: u16,
}

/// A service reachable through an ingress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableService {
    pub tags: TagSet,
    pub instances: u32,
    pub mesh: String,
}

// === impl ZoneIngress ===

impl ZoneIngress {
    /// The address other zones reach this ingress on.
    pub fn public_address(&self) -> Option<(&str, u16)> {
        let address = self
            .networking
            .advertised_address
            .as_deref()
            .filter(|a| !a.is_empty())?;
        let port = self.networking.advertised_port.filter(|p| *p != 0)?;
        Some((address, port))
    }
}
