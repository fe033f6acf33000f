use crate::tags::{Selector, TagSet};
use serde::{Deserialize, Serialize};

/// Configures the listeners of gateway dataplanes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    pub selectors: Vec<Selector>,
    #[serde(default)]
    pub tags: TagSet,
    pub conf: GatewayConf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConf {
    pub listeners: Vec<Listener>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub port: u16,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub tags: TagSet,
}
