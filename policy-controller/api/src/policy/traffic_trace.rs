use crate::tags::Selector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficTrace {
    pub selectors: Vec<Selector>,
    #[serde(default)]
    pub conf: TrafficTraceConf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficTraceConf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}
