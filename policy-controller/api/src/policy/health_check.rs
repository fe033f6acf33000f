use crate::{duration::ConfDuration, tags::Selector};
use serde::{Deserialize, Serialize};

/// Configures active health checking of a destination service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub sources: Vec<Selector>,
    pub destinations: Vec<Selector>,
    pub conf: HealthCheckConf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckConf {
    pub interval: ConfDuration,
    pub timeout: ConfDuration,
    pub unhealthy_threshold: u32,
    pub healthy_threshold: u32,
}
