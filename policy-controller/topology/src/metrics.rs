use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

/// Counts mesh context builds and their failures.
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    builds: Family<MeshLabels, Counter>,
    build_errors: Family<MeshLabels, Counter>,
    resolution_errors: Family<ResolutionLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct MeshLabels {
    mesh: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ResolutionLabels {
    mesh: String,
    kind: &'static str,
}

impl Metrics {
    pub fn register(reg: &mut Registry) -> Self {
        let metrics = Self::default();
        reg.register(
            "mesh_context_builds",
            "The number of mesh contexts built",
            metrics.builds.clone(),
        );
        reg.register(
            "mesh_context_build_errors",
            "The number of mesh context builds that failed",
            metrics.build_errors.clone(),
        );
        reg.register(
            "address_resolution_errors",
            "The number of resource addresses that could not be resolved",
            metrics.resolution_errors.clone(),
        );
        metrics
    }

    pub(crate) fn built(&self, mesh: &str) {
        self.builds.get_or_create(&mesh_labels(mesh)).inc();
    }

    pub(crate) fn build_failed(&self, mesh: &str) {
        self.build_errors.get_or_create(&mesh_labels(mesh)).inc();
    }

    pub(crate) fn resolution_failed(&self, mesh: &str, kind: &'static str) {
        self.resolution_errors
            .get_or_create(&ResolutionLabels {
                mesh: mesh.to_string(),
                kind,
            })
            .inc();
    }
}

fn mesh_labels(mesh: &str) -> MeshLabels {
    MeshLabels {
        mesh: mesh.to_string(),
    }
}
