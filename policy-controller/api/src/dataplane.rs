use crate::{
    tags::{TagSet, SERVICE_TAG, ZONE_TAG},
    zone::AvailableService,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// A proxied workload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataplane {
    pub networking: Networking,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    /// An IP address or a hostname.
    pub address: String,
    /// The address other zones use to reach this dataplane, when it differs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertised_address: Option<String>,
    #[serde(default)]
    pub inbound: Vec<Inbound>,
    #[serde(default)]
    pub outbound: Vec<Outbound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Ingress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<DataplaneGateway>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inbound {
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port: Option<u16>,
    /// Overrides the dataplane's address for this inbound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub tags: TagSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub ready: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outbound {
    /// Defaults to the loopback address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,
    pub port: u16,
    /// The destination service, for outbounds declared without tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default)]
    pub tags: TagSet,
}

/// Describes a dataplane running in ingress mode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    #[serde(default)]
    pub available_services: Vec<AvailableService>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataplaneGateway {
    pub tags: TagSet,
}

/// The local listener of an outbound.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutboundInterface {
    pub address: IpAddr,
    pub port: u16,
}

/// The address a dataplane serves an inbound on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InboundInterface {
    pub address: String,
    pub port: u16,
}

// === impl Dataplane ===

impl Dataplane {
    pub fn is_ingress(&self) -> bool {
        self.networking.ingress.is_some()
    }

    /// Returns every tag set this dataplane may be selected by.
    pub fn tag_sets(&self) -> impl Iterator<Item = &TagSet> {
        self.networking
            .inbound
            .iter()
            .map(|i| &i.tags)
            .chain(self.networking.gateway.iter().map(|g| &g.tags))
    }

    /// The zone an ingress dataplane serves.
    pub fn zone(&self) -> Option<&str> {
        self.networking
            .inbound
            .iter()
            .find_map(|i| i.tags.get(ZONE_TAG))
    }

    pub fn healthy_inbounds(&self) -> impl Iterator<Item = &Inbound> {
        self.networking.inbound.iter().filter(|i| i.is_healthy())
    }

    /// The address an inbound is reachable on.
    pub fn inbound_address<'a>(&'a self, inbound: &'a Inbound) -> &'a str {
        inbound
            .address
            .as_deref()
            .or(self.networking.advertised_address.as_deref())
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.networking.address)
    }

    pub fn inbound_interface(&self, inbound: &Inbound) -> InboundInterface {
        InboundInterface {
            address: self.inbound_address(inbound).to_string(),
            port: inbound.port,
        }
    }
}

// === impl Inbound ===

impl Inbound {
    /// Inbounds without a health report are considered healthy.
    pub fn is_healthy(&self) -> bool {
        self.health.map(|h| h.ready).unwrap_or(true)
    }
}

// === impl Outbound ===

impl Outbound {
    pub fn service(&self) -> Option<&str> {
        self.tags.service().or(self.service.as_deref())
    }

    /// The outbound's tags, including the legacy service name if the tags
    /// don't carry one.
    pub fn tags(&self) -> TagSet {
        let mut tags = self.tags.clone();
        if let Some(service) = self.service.as_deref() {
            if !tags.contains_key(SERVICE_TAG) {
                tags.insert(SERVICE_TAG, service);
            }
        }
        tags
    }

    pub fn interface(&self) -> OutboundInterface {
        OutboundInterface {
            address: self
                .address
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: self.port,
        }
    }
}

// === impl Ingress ===

impl Ingress {
    pub fn public_address(&self) -> Option<(&str, u16)> {
        let address = self.public_address.as_deref().filter(|a| !a.is_empty())?;
        let port = self.public_port.filter(|p| *p != 0)?;
        Some((address, port))
    }
}

// === impl OutboundInterface ===

impl std::fmt::Display for OutboundInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::net::SocketAddr::new(self.address, self.port).fmt(f)
    }
}

impl Serialize for OutboundInterface {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// === impl InboundInterface ===

impl std::fmt::Display for InboundInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl Serialize for InboundInterface {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
