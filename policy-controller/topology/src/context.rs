use crate::{
    dns::{resolve_dataplane_address, resolve_zone_ingress_address, LookupIp, ResolveError},
    endpoints::{build_endpoint_map, build_external_services_endpoint_map, Inventory},
    metrics::Metrics,
    proxy::{build_proxy, Proxy},
    vips::{build_virtual_outbound_view, vip_outbounds},
    Error, ResolverConfig,
};
use ahash::AHashMap;
use futures::future;
use mesh_policy_controller_api::{
    dataplane::Outbound,
    policy::{
        CircuitBreaker, FaultInjection, Gateway, HealthCheck, Retry, Timeout, TrafficLog,
        TrafficPermission, TrafficRoute, TrafficTrace,
    },
    Dataplane, ExternalService, Mesh, ReadOnlyResourceManager, Registry, Resource, ResourceSpec,
    Scope, StoreError, ZoneEgress, ZoneIngress,
};
use mesh_policy_controller_core::{EndpointMap, VipDomains};
use std::sync::Arc;

/// Builds a [`MeshContext`] from a resource manager's listings.
#[derive(Debug)]
pub struct MeshContextBuilder<M, L> {
    manager: M,
    lookup: L,
    registry: Arc<Registry>,
    config: ResolverConfig,
    metrics: Metrics,
}

/// Everything computed once per mesh, from which each dataplane's proxy view
/// is derived.
#[derive(Clone, Debug)]
pub struct MeshContext {
    pub mesh: Resource<Mesh>,
    pub config: ResolverConfig,
    /// Dataplanes whose addresses resolved, in listing order.
    pub dataplanes: Vec<Resource<Dataplane>>,
    pub zone_ingresses: Vec<Resource<ZoneIngress>>,
    pub zone_egresses: Vec<Resource<ZoneEgress>>,
    pub external_services: Vec<Resource<ExternalService>>,
    pub policies: Policies,
    pub endpoint_map: EndpointMap,
    pub external_services_endpoint_map: EndpointMap,
    pub vip_domains: Vec<VipDomains>,
    pub vip_outbounds: Vec<Outbound>,
    unresolved: AHashMap<String, ResolveError>,
}

/// The policies of a mesh, by kind.
#[derive(Clone, Debug, Default)]
pub struct Policies {
    pub traffic_routes: Vec<Resource<TrafficRoute>>,
    pub health_checks: Vec<Resource<HealthCheck>>,
    pub retries: Vec<Resource<Retry>>,
    pub timeouts: Vec<Resource<Timeout>>,
    pub circuit_breakers: Vec<Resource<CircuitBreaker>>,
    pub traffic_logs: Vec<Resource<TrafficLog>>,
    pub traffic_traces: Vec<Resource<TrafficTrace>>,
    pub gateways: Vec<Resource<Gateway>>,
    pub fault_injections: Vec<Resource<FaultInjection>>,
    pub traffic_permissions: Vec<Resource<TrafficPermission>>,
}

// === impl MeshContextBuilder ===

impl<M, L> MeshContextBuilder<M, L>
where
    M: ReadOnlyResourceManager,
    L: LookupIp,
{
    pub fn new(manager: M, lookup: L, registry: Arc<Registry>, config: ResolverConfig) -> Self {
        Self {
            manager,
            lookup,
            registry,
            config,
            metrics: Metrics::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Lists the names of all meshes.
    pub async fn meshes(&self) -> Result<Vec<String>, Error> {
        let meshes = self.list::<Mesh>("").await?;
        Ok(meshes.into_iter().map(|m| m.meta.name).collect())
    }

    /// Builds the context of a mesh.
    ///
    /// Fails if any listing fails. Dataplanes whose addresses can't be
    /// resolved are left out of the context and reported by
    /// [`MeshContext::proxy`].
    pub async fn build(&self, mesh: &str) -> Result<MeshContext, Error> {
        match self.try_build(mesh).await {
            Ok(ctx) => {
                self.metrics.built(mesh);
                Ok(ctx)
            }
            Err(error) => {
                tracing::error!(%error, mesh, "Failed to build mesh context");
                self.metrics.build_failed(mesh);
                Err(error)
            }
        }
    }

    async fn try_build(&self, mesh_name: &str) -> Result<MeshContext, Error> {
        let mesh = self
            .list::<Mesh>(mesh_name)
            .await?
            .into_iter()
            .find(|m| m.meta.name == mesh_name)
            .ok_or_else(|| Error::MeshNotFound(mesh_name.to_string()))?;
        let dataplanes = self.list::<Dataplane>(mesh_name).await?;
        let zone_ingresses = self.list::<ZoneIngress>(mesh_name).await?;
        let zone_egresses = self.list::<ZoneEgress>(mesh_name).await?;
        let external_services = self.list::<ExternalService>(mesh_name).await?;
        let policies = Policies {
            traffic_routes: self.list(mesh_name).await?,
            health_checks: self.list(mesh_name).await?,
            retries: self.list(mesh_name).await?,
            timeouts: self.list(mesh_name).await?,
            circuit_breakers: self.list(mesh_name).await?,
            traffic_logs: self.list(mesh_name).await?,
            traffic_traces: self.list(mesh_name).await?,
            gateways: self.list(mesh_name).await?,
            fault_injections: self.list(mesh_name).await?,
            traffic_permissions: self.list(mesh_name).await?,
        };

        let (dataplanes, unresolved) = self.resolve_dataplanes(mesh_name, &dataplanes).await;
        let zone_ingresses = self.resolve_zone_ingresses(mesh_name, &zone_ingresses).await;

        let inventory = Inventory {
            mesh: &mesh,
            local_zone: &self.config.zone,
            dataplanes: &dataplanes,
            zone_ingresses: &zone_ingresses,
            zone_egresses: &zone_egresses,
            external_services: &external_services,
        };
        let endpoint_map = build_endpoint_map(&inventory);
        let external_services_endpoint_map = build_external_services_endpoint_map(&inventory);

        let mut view = build_virtual_outbound_view(
            mesh_name,
            &self.config.zone,
            &dataplanes,
            &zone_ingresses,
            &external_services,
        );
        if let Err(error) = view.allocate(self.config.vip_cidr) {
            tracing::warn!(%error, mesh = mesh_name, "Some virtual outbounds have no address");
        }
        let (vip_domains, vip_outbounds) =
            vip_outbounds(&view, &self.config.dns_domain, self.config.vip_port);

        tracing::debug!(
            mesh = mesh_name,
            dataplanes = dataplanes.len(),
            unresolved = unresolved.len(),
            services = endpoint_map.len(),
            vips = vip_domains.len(),
            "Built mesh context",
        );

        Ok(MeshContext {
            mesh,
            config: self.config.clone(),
            dataplanes,
            zone_ingresses,
            zone_egresses,
            external_services,
            policies,
            endpoint_map,
            external_services_endpoint_map,
            vip_domains,
            vip_outbounds,
            unresolved,
        })
    }

    /// Lists a registered kind. Unregistered kinds have no resources.
    async fn list<S: ResourceSpec>(&self, mesh: &str) -> Result<Vec<Resource<S>>, StoreError> {
        let Some(descriptor) = self.registry.descriptor(S::KIND) else {
            return Ok(Vec::new());
        };
        let filter = match descriptor.scope {
            Scope::Mesh => Some(mesh),
            Scope::Global => None,
        };
        self.manager.list::<S>(filter).await
    }

    async fn resolve_dataplanes(
        &self,
        mesh: &str,
        dataplanes: &[Resource<Dataplane>],
    ) -> (Vec<Resource<Dataplane>>, AHashMap<String, ResolveError>) {
        let results = future::join_all(dataplanes.iter().map(|dp| async move {
            (
                dp.meta.name.clone(),
                resolve_dataplane_address(&self.lookup, dp).await,
            )
        }))
        .await;

        let mut resolved = Vec::with_capacity(results.len());
        let mut unresolved = AHashMap::new();
        for (name, result) in results {
            match result {
                Ok(dp) => resolved.push(dp),
                Err(error) => {
                    tracing::error!(
                        %error,
                        mesh,
                        dataplane = %name,
                        "Failed to resolve dataplane address"
                    );
                    self.metrics.resolution_failed(mesh, "dataplane");
                    unresolved.insert(name, error);
                }
            }
        }
        (resolved, unresolved)
    }

    async fn resolve_zone_ingresses(
        &self,
        mesh: &str,
        ingresses: &[Resource<ZoneIngress>],
    ) -> Vec<Resource<ZoneIngress>> {
        future::join_all(
            ingresses
                .iter()
                .map(|zi| resolve_zone_ingress_address(&self.lookup, zi)),
        )
        .await
        .into_iter()
        .zip(ingresses)
        .filter_map(|(result, zi)| match result {
            Ok(resolved) => Some(resolved),
            Err(error) => {
                tracing::error!(
                    %error,
                    mesh,
                    zone_ingress = %zi.meta.name,
                    "Failed to resolve zone ingress address"
                );
                self.metrics.resolution_failed(mesh, "zone_ingress");
                None
            }
        })
        .collect()
    }
}

// === impl MeshContext ===

impl MeshContext {
    pub fn name(&self) -> &str {
        &self.mesh.meta.name
    }

    pub fn dataplane(&self, name: &str) -> Option<&Resource<Dataplane>> {
        self.dataplanes.iter().find(|dp| dp.meta.name == name)
    }

    /// Names every dataplane of the mesh, including those whose address
    /// could not be resolved.
    pub fn dataplane_names(&self) -> Vec<&str> {
        let mut names = self
            .dataplanes
            .iter()
            .map(|dp| dp.meta.name.as_str())
            .chain(self.unresolved.keys().map(String::as_str))
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Computes the proxy view of a dataplane.
    pub fn proxy(&self, name: &str) -> Result<Proxy, Error> {
        if let Some(error) = self.unresolved.get(name) {
            return Err(Error::Resolve {
                dataplane: name.to_string(),
                source: error.clone(),
            });
        }
        let dataplane = self
            .dataplane(name)
            .ok_or_else(|| Error::DataplaneNotFound(name.to_string()))?;
        Ok(build_proxy(dataplane, self))
    }
}
