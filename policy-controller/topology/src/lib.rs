//! Computes the configuration of each dataplane in a mesh from the mesh's
//! resources: routes, destinations, endpoints, selected policies and
//! virtual addresses.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod context;
pub mod dns;
pub mod endpoints;
mod metrics;
pub mod policies;
mod proxy;
pub mod routes;
pub mod vips;


pub use self::{
    context::{MeshContext, MeshContextBuilder, Policies},
    dns::{lookup_fn, LookupIp, ResolveError, SystemResolver},
    endpoints::{build_endpoint_map, build_external_services_endpoint_map, Inventory},
    metrics::Metrics,
    proxy::Proxy,
    routes::{build_destination_map, build_route_map, RouteMap},
    vips::{VipError, VirtualOutboundMeshView},
};
use ipnet::{IpNet, Ipv4Net};
use mesh_policy_controller_api::StoreError;
use std::net::Ipv4Addr;

/// Settings shared by every mesh context build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// The zone this controller runs in. Empty in a single-zone deployment.
    pub zone: String,

    /// The top-level domain of virtual addresses' DNS names.
    pub dns_domain: String,

    /// The port proxies listen on for every virtual address.
    pub vip_port: u16,

    /// The range virtual addresses are allocated from.
    pub vip_cidr: IpNet,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("mesh {0} not found")]
    MeshNotFound(String),

    #[error("dataplane {0} not found")]
    DataplaneNotFound(String),

    #[error("failed to resolve the address of dataplane {dataplane}")]
    Resolve {
        dataplane: String,
        #[source]
        source: ResolveError,
    },
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            zone: String::new(),
            dns_domain: "mesh".to_string(),
            vip_port: 80,
            vip_cidr: IpNet::V4(Ipv4Net::new_assert(Ipv4Addr::new(240, 0, 0, 0), 4)),
        }
    }
}
