use crate::tags::TagSet;
use serde::{Deserialize, Serialize};

/// A service outside the mesh, addressed by `host:port`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalService {
    pub networking: ExternalNetworking,
    pub tags: TagSet,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNetworking {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
    /// Skips the host-based DNS entry for this service.
    #[serde(default)]
    pub disable_host_dns_entry: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tls {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

// === impl ExternalService ===

impl ExternalService {
    pub fn service(&self) -> Option<&str> {
        self.tags.service()
    }

    pub fn tls_enabled(&self) -> bool {
        self.networking.tls.as_ref().map(|t| t.enabled).unwrap_or(false)
    }

    /// Splits the service's address, returning `None` if it is malformed.
    pub fn host_port(&self) -> Option<(&str, u16)> {
        split_host_port(&self.networking.address)
    }
}

pub fn split_host_port(address: &str) -> Option<(&str, u16)> {
    let (host, port) = address.rsplit_once(':')?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some((host, port.parse().ok()?))
}
