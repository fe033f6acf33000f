use crate::tags::Selector;
use serde::{Deserialize, Serialize};

/// Routes an outbound's traffic across weighted destinations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRoute {
    pub sources: Vec<Selector>,
    pub destinations: Vec<Selector>,
    pub conf: TrafficRouteConf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRouteConf {
    #[serde(default)]
    pub split: Vec<Split>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancer>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub weight: u32,
    pub destination: Selector,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadBalancer {
    RoundRobin,
    LeastRequest,
    RingHash,
    Random,
    Maglev,
}
