use serde::{Deserialize, Serialize};

/// Mesh-wide settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtls: Option<Mtls>,
    #[serde(default)]
    pub routing: Routing,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mtls {
    /// Names the certificate authority backend in use; mTLS is disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_backend: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    #[serde(default)]
    pub locality_aware_load_balancing: bool,
    /// Routes traffic to external services through zone egresses.
    #[serde(default)]
    pub zone_egress: bool,
}

// === impl Mesh ===

impl Mesh {
    pub fn mtls_enabled(&self) -> bool {
        self.mtls
            .as_ref()
            .and_then(|m| m.enabled_backend.as_deref())
            .map(|b| !b.is_empty())
            .unwrap_or(false)
    }

    pub fn locality_aware_lb_enabled(&self) -> bool {
        self.routing.locality_aware_load_balancing
    }

    pub fn zone_egress_enabled(&self) -> bool {
        self.routing.zone_egress
    }
}
