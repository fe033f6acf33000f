use mesh_policy_controller_api::{
    dataplane::Dataplane,
    tags::{EXTERNAL_SERVICE_TAG, REGION_TAG, SUB_ZONE_TAG, ZONE_TAG},
    zone::AvailableService,
    ExternalService, Mesh, Resource, TagSet, ZoneEgress, ZoneIngress,
};
use mesh_policy_controller_core::{
    outbound::{PRIORITY_LOCAL, PRIORITY_REMOTE},
    Endpoint, EndpointMap, ExternalServiceInfo, Locality,
};

/// The resources a mesh's endpoints are built from.
#[derive(Copy, Clone, Debug)]
pub struct Inventory<'a> {
    pub mesh: &'a Resource<Mesh>,
    pub local_zone: &'a str,
    pub dataplanes: &'a [Resource<Dataplane>],
    pub zone_ingresses: &'a [Resource<ZoneIngress>],
    pub zone_egresses: &'a [Resource<ZoneEgress>],
    pub external_services: &'a [Resource<ExternalService>],
}

/// Builds the endpoints of every service reachable from the local zone.
///
/// Endpoints are listed in the order local dataplanes, ingresses, external
/// services; within each group they follow the order of the inventory.
pub fn build_endpoint_map(inventory: &Inventory<'_>) -> EndpointMap {
    let mut endpoints = EndpointMap::new();
    fill_dataplane_endpoints(&mut endpoints, inventory);
    fill_ingress_endpoints(&mut endpoints, inventory);
    if inventory.mesh.spec.zone_egress_enabled() {
        fill_external_endpoints_through_egress(&mut endpoints, inventory);
    } else {
        fill_external_endpoints(&mut endpoints, inventory);
    }
    endpoints
}

/// Builds the endpoints a zone egress uses to reach external services.
///
/// Empty unless the mesh routes external traffic through zone egresses.
pub fn build_external_services_endpoint_map(inventory: &Inventory<'_>) -> EndpointMap {
    let mut endpoints = EndpointMap::new();
    if inventory.mesh.spec.zone_egress_enabled() {
        fill_external_endpoints(&mut endpoints, inventory);
    }
    endpoints
}

fn fill_dataplane_endpoints(endpoints: &mut EndpointMap, inventory: &Inventory<'_>) {
    let locality_aware = inventory.mesh.spec.locality_aware_lb_enabled();
    for dataplane in inventory.dataplanes.iter() {
        let spec = &dataplane.spec;
        if spec.is_ingress() {
            continue;
        }
        for inbound in spec.healthy_inbounds() {
            let Some(service) = inbound.tags.service() else {
                tracing::debug!(
                    dataplane = %dataplane.meta.name,
                    port = inbound.port,
                    "Inbound has no service tag"
                );
                continue;
            };
            endpoints
                .entry(service.to_string())
                .or_default()
                .push(Endpoint {
                    target: spec.inbound_address(inbound).to_string(),
                    port: inbound.port,
                    tags: inbound.tags.clone(),
                    weight: 1,
                    locality: locality(&inbound.tags, PRIORITY_LOCAL, locality_aware),
                    external_service: None,
                });
        }
    }
}

fn fill_ingress_endpoints(endpoints: &mut EndpointMap, inventory: &Inventory<'_>) {
    // Ingresses route by SNI, so cross-zone traffic needs mTLS.
    if !inventory.mesh.spec.mtls_enabled() {
        return;
    }

    let ingress_dataplanes = inventory.dataplanes.iter().filter_map(|dp| {
        let ingress = dp.spec.networking.ingress.as_ref()?;
        Some((
            dp.spec.zone().unwrap_or_default(),
            ingress.public_address(),
            ingress.available_services.as_slice(),
        ))
    });
    let zone_ingresses = inventory.zone_ingresses.iter().map(|zi| {
        (
            zi.spec.zone.as_str(),
            zi.spec.public_address(),
            zi.spec.available_services.as_slice(),
        )
    });

    for (zone, public_address, services) in ingress_dataplanes.chain(zone_ingresses) {
        if zone.is_empty() || zone == inventory.local_zone {
            continue;
        }
        let Some((address, port)) = public_address else {
            continue;
        };
        for service in services {
            add_ingress_endpoint(endpoints, inventory, service, address, port);
        }
    }
}

fn add_ingress_endpoint(
    endpoints: &mut EndpointMap,
    inventory: &Inventory<'_>,
    service: &AvailableService,
    address: &str,
    port: u16,
) {
    if service.mesh != inventory.mesh.meta.name {
        return;
    }
    let Some(name) = service.tags.service() else {
        return;
    };
    endpoints.entry(name.to_string()).or_default().push(Endpoint {
        target: address.to_string(),
        port,
        tags: service.tags.clone(),
        weight: service.instances,
        locality: locality(
            &service.tags,
            PRIORITY_REMOTE,
            inventory.mesh.spec.locality_aware_lb_enabled(),
        ),
        external_service: None,
    });
}

fn fill_external_endpoints(endpoints: &mut EndpointMap, inventory: &Inventory<'_>) {
    let locality_aware = inventory.mesh.spec.locality_aware_lb_enabled();
    for es in inventory.external_services.iter() {
        let Some(service) = es.spec.service() else {
            tracing::warn!(external_service = %es.meta.name, "External service has no service tag");
            continue;
        };
        let Some((host, port)) = es.spec.host_port() else {
            tracing::warn!(
                external_service = %es.meta.name,
                address = %es.spec.networking.address,
                "Invalid external service address",
            );
            continue;
        };

        let tls_enabled = es.spec.tls_enabled();
        let mut tags = es.spec.tags.clone();
        if tls_enabled {
            tags.insert(EXTERNAL_SERVICE_TAG, es.meta.name.as_str());
        }
        endpoints.entry(service.to_string()).or_default().push(Endpoint {
            target: host.to_string(),
            port,
            locality: locality(&tags, PRIORITY_REMOTE, locality_aware),
            tags,
            weight: 1,
            external_service: Some(ExternalServiceInfo {
                tls_enabled,
                server_name: es
                    .spec
                    .networking
                    .tls
                    .as_ref()
                    .and_then(|t| t.server_name.clone()),
            }),
        });
    }
}

fn fill_external_endpoints_through_egress(endpoints: &mut EndpointMap, inventory: &Inventory<'_>) {
    let locality_aware = inventory.mesh.spec.locality_aware_lb_enabled();
    for es in inventory.external_services.iter() {
        let Some(service) = es.spec.service() else {
            continue;
        };
        for egress in inventory.zone_egresses.iter() {
            let networking = &egress.spec.networking;
            endpoints.entry(service.to_string()).or_default().push(Endpoint {
                target: networking.address.clone(),
                port: networking.port,
                tags: es.spec.tags.clone(),
                weight: 1,
                locality: locality(&es.spec.tags, PRIORITY_REMOTE, locality_aware),
                external_service: Some(ExternalServiceInfo {
                    tls_enabled: es.spec.tls_enabled(),
                    server_name: None,
                }),
            });
        }
    }
}

/// Returns the locality of an endpoint with the given tags, if the mesh
/// balances by locality and the tags describe one.
pub fn locality(tags: &TagSet, priority: u32, enabled: bool) -> Option<Locality> {
    if !enabled {
        return None;
    }
    let region = tags.get(REGION_TAG);
    let zone = tags.get(ZONE_TAG);
    let sub_zone = tags.get(SUB_ZONE_TAG);
    if region.is_none() && zone.is_none() && sub_zone.is_none() {
        return None;
    }
    Some(Locality {
        region: region.unwrap_or_default().to_string(),
        zone: zone.unwrap_or_default().to_string(),
        sub_zone: sub_zone.unwrap_or_default().to_string(),
        priority,
    })
}
