use crate::{
    dataplane::Dataplane,
    external_service::ExternalService,
    mesh::Mesh,
    policy::{
        CircuitBreaker, FaultInjection, Gateway, HealthCheck, Retry, Timeout, TrafficLog,
        TrafficPermission, TrafficRoute, TrafficTrace,
    },
    zone::{ZoneEgress, ZoneIngress},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies a stored resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    /// Empty for global resources like zone ingresses.
    #[serde(default)]
    pub mesh: String,
    pub name: String,
    #[serde(default)]
    pub creation_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource<S> {
    pub meta: ResourceMeta,
    pub spec: S,
}

/// A resource spec type that may be stored and listed.
pub trait ResourceSpec: Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn into_any(resource: Resource<Self>) -> AnyResource;

    fn from_any(resource: &AnyResource) -> Option<&Resource<Self>>;
}

// === impl ResourceMeta ===

impl ResourceMeta {
    pub fn new(mesh: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            name: name.into(),
            creation_time: DateTime::default(),
        }
    }

    pub fn with_creation_time(mut self, creation_time: DateTime<Utc>) -> Self {
        self.creation_time = creation_time;
        self
    }
}

// === impl Resource ===

impl<S> Resource<S> {
    pub fn new(meta: ResourceMeta, spec: S) -> Self {
        Self { meta, spec }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn mesh(&self) -> &str {
        &self.meta.mesh
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.meta.creation_time
    }
}

macro_rules! resource_kinds {
    ($($kind:ident => $name:literal),+ $(,)?) => {
        /// Every type of resource known to the controller.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ResourceKind {
            $($kind),+
        }

        /// A resource of any kind, as found in snapshots and stores.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type")]
        pub enum AnyResource {
            $($kind(Resource<$kind>)),+
        }

        impl ResourceKind {
            pub const ALL: &'static [ResourceKind] = &[$(ResourceKind::$kind),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$kind => $name),+
                }
            }
        }

        impl AnyResource {
            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(Self::$kind(_) => ResourceKind::$kind),+
                }
            }

            pub fn meta(&self) -> &ResourceMeta {
                match self {
                    $(Self::$kind(r) => &r.meta),+
                }
            }
        }

        $(
            impl ResourceSpec for $kind {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn into_any(resource: Resource<Self>) -> AnyResource {
                    AnyResource::$kind(resource)
                }

                fn from_any(resource: &AnyResource) -> Option<&Resource<Self>> {
                    match resource {
                        AnyResource::$kind(r) => Some(r),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )+
    };
}

resource_kinds! {
    Mesh => "Mesh",
    Dataplane => "Dataplane",
    ExternalService => "ExternalService",
    ZoneIngress => "ZoneIngress",
    ZoneEgress => "ZoneEgress",
    TrafficRoute => "TrafficRoute",
    HealthCheck => "HealthCheck",
    Retry => "Retry",
    Timeout => "Timeout",
    CircuitBreaker => "CircuitBreaker",
    TrafficLog => "TrafficLog",
    TrafficTrace => "TrafficTrace",
    Gateway => "Gateway",
    FaultInjection => "FaultInjection",
    TrafficPermission => "TrafficPermission",
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource type: {0}")]
pub struct UnknownKind(String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        policy::{LoadBalancer, Split},
        tags::Selector,
    };
    use maplit::btreemap;

    #[test]
    fn parses_tagged_resources() {
        let json = serde_json::json!({
            "type": "TrafficRoute",
            "meta": { "mesh": "default", "name": "route-redis" },
            "spec": {
                "sources": [{ "service": "*" }],
                "destinations": [{ "service": "redis" }],
                "conf": {
                    "split": [{
                        "weight": 90,
                        "destination": { "service": "redis", "role": "master" }
                    }],
                    "loadBalancer": "roundRobin"
                }
            }
        });

        let resource = serde_json::from_value::<AnyResource>(json).expect("resource must parse");
        assert_eq!(resource.kind(), ResourceKind::TrafficRoute);
        assert_eq!(resource.meta().name, "route-redis");
        assert_eq!(resource.meta().creation_time, DateTime::<Utc>::default());

        let route = TrafficRoute::from_any(&resource).expect("must be a traffic route");
        assert_eq!(
            route.spec.conf.split,
            vec![Split {
                weight: 90,
                destination: Selector::from(btreemap! {
                    "service".to_string() => "redis".to_string(),
                    "role".to_string() => "master".to_string(),
                }),
            }]
        );
        assert_eq!(route.spec.conf.load_balancer, Some(LoadBalancer::RoundRobin));
        assert!(Dataplane::from_any(&resource).is_none());
    }

    #[test]
    fn kind_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>(), Ok(*kind));
        }
        assert!("Pod".parse::<ResourceKind>().is_err());
    }
}
