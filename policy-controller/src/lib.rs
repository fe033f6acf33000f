#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
mod report;
mod snapshot;

pub use self::{
    args::Args,
    report::{report, MeshReport},
    snapshot::Snapshot,
};
pub use mesh_policy_controller_api as api;
pub use mesh_policy_controller_core as core;
pub use mesh_policy_controller_topology as topology;
