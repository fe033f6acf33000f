use crate::tags::Selector;
use serde::{Deserialize, Serialize};

/// Authorizes sources to connect to a destination's inbounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPermission {
    pub sources: Vec<Selector>,
    pub destinations: Vec<Selector>,
}
