use crate::resource::ResourceKind;
use std::collections::BTreeMap;

/// Whether resources of a kind belong to a mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Mesh,
}

/// How a policy kind selects the workloads it applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolicyShape {
    /// Not a policy.
    None,
    /// Selects source and destination workloads of outbound connections.
    Connection,
    /// Selects source and destination workloads of inbound connections.
    InboundConnection,
    /// Selects dataplanes.
    Dataplane,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub shape: PolicyShape,
}

/// The set of resource kinds a controller knows about.
///
/// The registry is passed explicitly to the components that need it.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    descriptors: BTreeMap<ResourceKind, Descriptor>,
}

// === impl Descriptor ===

impl Descriptor {
    pub fn of(kind: ResourceKind) -> Self {
        use ResourceKind::*;

        let scope = match kind {
            Mesh | ZoneIngress | ZoneEgress => Scope::Global,
            _ => Scope::Mesh,
        };
        let shape = match kind {
            TrafficRoute | HealthCheck | Retry | Timeout | CircuitBreaker => {
                PolicyShape::Connection
            }
            FaultInjection | TrafficPermission => PolicyShape::InboundConnection,
            TrafficLog | TrafficTrace | Gateway => PolicyShape::Dataplane,
            Mesh | Dataplane | ExternalService | ZoneIngress | ZoneEgress => PolicyShape::None,
        };
        Self { kind, scope, shape }
    }
}

// === impl Registry ===

impl Registry {
    /// A registry with every built-in resource kind.
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::default();
        for kind in ResourceKind::ALL {
            registry.register(Descriptor::of(*kind));
        }
        registry
    }

    /// Registers a resource kind, replacing any existing descriptor.
    pub fn register(&mut self, descriptor: Descriptor) -> &mut Self {
        self.descriptors.insert(descriptor.kind, descriptor);
        self
    }

    pub fn descriptor(&self, kind: ResourceKind) -> Option<&Descriptor> {
        self.descriptors.get(&kind)
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.descriptors.contains_key(&kind)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }

    pub fn policies(&self, shape: PolicyShape) -> impl Iterator<Item = ResourceKind> + '_ {
        self.descriptors
            .values()
            .filter(move |d| d.shape == shape)
            .map(|d| d.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kinds() {
        let registry = Registry::with_builtin_kinds();
        assert_eq!(registry.descriptors().count(), ResourceKind::ALL.len());
        assert_eq!(
            registry.descriptor(ResourceKind::ZoneIngress).map(|d| d.scope),
            Some(Scope::Global)
        );
        assert_eq!(
            registry
                .policies(PolicyShape::Dataplane)
                .collect::<Vec<_>>(),
            vec![
                ResourceKind::TrafficLog,
                ResourceKind::TrafficTrace,
                ResourceKind::Gateway,
            ]
        );
    }

    #[test]
    fn empty_registry() {
        let mut registry = Registry::default();
        assert!(!registry.contains(ResourceKind::Dataplane));
        registry.register(Descriptor::of(ResourceKind::Dataplane));
        assert!(registry.contains(ResourceKind::Dataplane));
    }
}
