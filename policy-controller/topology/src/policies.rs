use mesh_policy_controller_api::{
    policy::{
        CircuitBreaker, FaultInjection, Gateway, HealthCheck, Retry, Timeout, TrafficLog,
        TrafficPermission, TrafficTrace,
    },
    Dataplane, InboundInterface, Resource,
};
use mesh_policy_controller_core::{
    select_connection_policies, select_dataplane_policy, select_inbound_connection_policies,
    ConnectionPolicy, DestinationMap, ServiceName,
};
use std::collections::BTreeMap;

/// The policy selected for each destination service.
pub type OutboundPolicyMap<S> = BTreeMap<ServiceName, Resource<S>>;

/// The policy selected for each inbound.
pub type InboundPolicyMap<S> = BTreeMap<InboundInterface, Resource<S>>;

pub fn build_health_check_map(
    dataplane: &Dataplane,
    destinations: &DestinationMap,
    health_checks: &[Resource<HealthCheck>],
) -> OutboundPolicyMap<HealthCheck> {
    build_outbound_policy_map(dataplane, destinations, health_checks)
}

pub fn build_retry_map(
    dataplane: &Dataplane,
    destinations: &DestinationMap,
    retries: &[Resource<Retry>],
) -> OutboundPolicyMap<Retry> {
    build_outbound_policy_map(dataplane, destinations, retries)
}

pub fn build_timeout_map(
    dataplane: &Dataplane,
    destinations: &DestinationMap,
    timeouts: &[Resource<Timeout>],
) -> OutboundPolicyMap<Timeout> {
    build_outbound_policy_map(dataplane, destinations, timeouts)
}

pub fn build_circuit_breaker_map(
    dataplane: &Dataplane,
    destinations: &DestinationMap,
    circuit_breakers: &[Resource<CircuitBreaker>],
) -> OutboundPolicyMap<CircuitBreaker> {
    build_outbound_policy_map(dataplane, destinations, circuit_breakers)
}

pub fn build_fault_injection_map(
    dataplane: &Dataplane,
    fault_injections: &[Resource<FaultInjection>],
) -> InboundPolicyMap<FaultInjection> {
    build_inbound_policy_map(dataplane, fault_injections)
}

pub fn build_traffic_permission_map(
    dataplane: &Dataplane,
    permissions: &[Resource<TrafficPermission>],
) -> InboundPolicyMap<TrafficPermission> {
    build_inbound_policy_map(dataplane, permissions)
}

pub fn select_traffic_log(
    dataplane: &Dataplane,
    logs: &[Resource<TrafficLog>],
) -> Option<Resource<TrafficLog>> {
    select_dataplane_policy(dataplane, logs).cloned()
}

pub fn select_traffic_trace(
    dataplane: &Dataplane,
    traces: &[Resource<TrafficTrace>],
) -> Option<Resource<TrafficTrace>> {
    select_dataplane_policy(dataplane, traces).cloned()
}

/// Only gateway dataplanes are configured by gateway policies.
pub fn select_gateway(
    dataplane: &Dataplane,
    gateways: &[Resource<Gateway>],
) -> Option<Resource<Gateway>> {
    dataplane.networking.gateway.as_ref()?;
    select_dataplane_policy(dataplane, gateways).cloned()
}

fn build_outbound_policy_map<S: Clone>(
    dataplane: &Dataplane,
    destinations: &DestinationMap,
    policies: &[Resource<S>],
) -> OutboundPolicyMap<S>
where
    Resource<S>: ConnectionPolicy,
{
    select_connection_policies(dataplane, destinations, policies)
        .into_iter()
        .map(|(service, policy)| (service, policy.clone()))
        .collect()
}

fn build_inbound_policy_map<S: Clone>(
    dataplane: &Dataplane,
    policies: &[Resource<S>],
) -> InboundPolicyMap<S>
where
    Resource<S>: ConnectionPolicy,
{
    select_inbound_connection_policies(dataplane, policies)
        .into_iter()
        .map(|(iface, policy)| (iface, policy.clone()))
        .collect()
}
