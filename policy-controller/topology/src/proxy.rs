use crate::{
    context::MeshContext,
    policies::{
        build_circuit_breaker_map, build_fault_injection_map, build_health_check_map,
        build_retry_map, build_timeout_map, build_traffic_permission_map, select_gateway,
        select_traffic_log, select_traffic_trace, InboundPolicyMap, OutboundPolicyMap,
    },
    routes::{build_destination_map, build_route_map, RouteMap},
};
use mesh_policy_controller_api::{
    policy::{
        CircuitBreaker, FaultInjection, Gateway, HealthCheck, Retry, Timeout, TrafficLog,
        TrafficPermission, TrafficTrace,
    },
    Dataplane, Resource,
};
use mesh_policy_controller_core::{DestinationMap, EndpointMap};
use serde::Serialize;

/// Everything a single dataplane's proxy is configured from.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    pub dataplane: Resource<Dataplane>,
    pub routes: RouteMap,
    pub destinations: DestinationMap,
    /// Endpoints of the services in `destinations`.
    pub endpoints: EndpointMap,
    pub health_checks: OutboundPolicyMap<HealthCheck>,
    pub retries: OutboundPolicyMap<Retry>,
    pub timeouts: OutboundPolicyMap<Timeout>,
    pub circuit_breakers: OutboundPolicyMap<CircuitBreaker>,
    pub fault_injections: InboundPolicyMap<FaultInjection>,
    pub traffic_permissions: InboundPolicyMap<TrafficPermission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_log: Option<Resource<TrafficLog>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_trace: Option<Resource<TrafficTrace>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Resource<Gateway>>,
}

pub(crate) fn build_proxy(dataplane: &Resource<Dataplane>, ctx: &MeshContext) -> Proxy {
    let dp = &dataplane.spec;
    let policies = &ctx.policies;

    let routes = build_route_map(dp, &policies.traffic_routes);
    let destinations = build_destination_map(dp, &routes);
    let endpoints = destinations
        .keys()
        .filter_map(|service| {
            let eps = ctx.endpoint_map.get(service)?;
            Some((service.clone(), eps.clone()))
        })
        .collect();

    Proxy {
        health_checks: build_health_check_map(dp, &destinations, &policies.health_checks),
        retries: build_retry_map(dp, &destinations, &policies.retries),
        timeouts: build_timeout_map(dp, &destinations, &policies.timeouts),
        circuit_breakers: build_circuit_breaker_map(dp, &destinations, &policies.circuit_breakers),
        fault_injections: build_fault_injection_map(dp, &policies.fault_injections),
        traffic_permissions: build_traffic_permission_map(dp, &policies.traffic_permissions),
        traffic_log: select_traffic_log(dp, &policies.traffic_logs),
        traffic_trace: select_traffic_trace(dp, &policies.traffic_traces),
        gateway: select_gateway(dp, &policies.gateways),
        dataplane: dataplane.clone(),
        routes,
        destinations,
        endpoints,
    }
}
