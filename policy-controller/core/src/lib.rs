//! Policy selection and the outputs the controller computes for proxies.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod connection;
pub mod dataplane;
pub mod inbound;
pub mod outbound;
mod policy;


pub use self::{
    connection::{select_connection_policies, ConnectionPolicy},
    dataplane::{select_dataplane_policy, DataplanePolicy},
    inbound::{select_inbound_connection_policies, select_inbound_connection_policy},
    outbound::{
        DestinationMap, Endpoint, EndpointMap, ExternalServiceInfo, Locality, ServiceName,
        TagSelectorSet, VipDomains,
    },
    policy::Policy,
};
