//! Policy resources.
//!
//! Connection policies select a pair of source and destination workloads;
//! dataplane policies select individual dataplanes.

mod circuit_breaker;
mod fault_injection;
mod gateway;
mod health_check;
mod retry;
mod timeout;
mod traffic_log;
mod traffic_permission;
mod traffic_route;
mod traffic_trace;

pub use self::{
    circuit_breaker::{CircuitBreaker, CircuitBreakerConf, Detectors, Thresholds},
    fault_injection::{Abort, Delay, FaultInjection, FaultInjectionConf},
    gateway::{Gateway, GatewayConf, Listener},
    health_check::{HealthCheck, HealthCheckConf},
    retry::{HttpRetry, Retry, RetryConf, TcpRetry},
    timeout::{Timeout, TimeoutConf},
    traffic_log::{TrafficLog, TrafficLogConf},
    traffic_permission::TrafficPermission,
    traffic_route::{LoadBalancer, Split, TrafficRoute, TrafficRouteConf},
    traffic_trace::{TrafficTrace, TrafficTraceConf},
};
use crate::tags::Selector;

/// A policy applied to connections between a source and a destination.
pub trait ConnectionPolicySpec {
    fn sources(&self) -> &[Selector];

    fn destinations(&self) -> &[Selector];
}

/// A policy applied to a dataplane as a whole.
pub trait DataplanePolicySpec {
    fn selectors(&self) -> &[Selector];
}

macro_rules! connection_policy {
    ($($spec:ty),+ $(,)?) => {
        $(
            impl ConnectionPolicySpec for $spec {
                fn sources(&self) -> &[Selector] {
                    &self.sources
                }

                fn destinations(&self) -> &[Selector] {
                    &self.destinations
                }
            }
        )+
    };
}

connection_policy!(
    CircuitBreaker,
    FaultInjection,
    HealthCheck,
    Retry,
    Timeout,
    TrafficPermission,
    TrafficRoute,
);

macro_rules! dataplane_policy {
    ($($spec:ty),+ $(,)?) => {
        $(
            impl DataplanePolicySpec for $spec {
                fn selectors(&self) -> &[Selector] {
                    &self.selectors
                }
            }
        )+
    };
}

dataplane_policy!(Gateway, TrafficLog, TrafficTrace);
