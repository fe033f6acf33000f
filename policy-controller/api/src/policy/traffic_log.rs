use crate::tags::Selector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficLog {
    pub selectors: Vec<Selector>,
    #[serde(default)]
    pub conf: TrafficLogConf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficLogConf {
    /// Names a logging backend; the mesh default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}
