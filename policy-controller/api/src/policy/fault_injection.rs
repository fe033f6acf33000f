use crate::{duration::ConfDuration, tags::Selector};
use serde::{Deserialize, Serialize};

/// Injects delays and aborts into inbound traffic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultInjection {
    pub sources: Vec<Selector>,
    pub destinations: Vec<Selector>,
    pub conf: FaultInjectionConf,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultInjectionConf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort: Option<Abort>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    pub percentage: f64,
    pub value: ConfDuration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Abort {
    pub percentage: f64,
    pub http_status: u16,
}
