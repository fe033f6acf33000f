use crate::{
    api::dataplane::Outbound,
    core::{EndpointMap, VipDomains},
    topology::{MeshContext, Proxy},
};
use anyhow::Result;
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

/// The resolved topology of a mesh.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshReport {
    pub mesh: String,
    pub endpoints: EndpointMap,
    pub external_services_endpoints: EndpointMap,
    pub vip_domains: Vec<VipDomains>,
    pub vip_outbounds: Vec<Outbound>,
    pub proxies: BTreeMap<String, Proxy>,
    /// Dataplanes without a proxy view, with the reason.
    pub errors: BTreeMap<String, String>,
}

/// Computes the proxy view of every dataplane in a mesh, each on its own
/// task.
pub async fn report(ctx: Arc<MeshContext>) -> Result<MeshReport> {
    let names = ctx
        .dataplane_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let tasks = names
        .into_iter()
        .map(|name| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let proxy = ctx.proxy(&name);
                (name, proxy)
            })
        })
        .collect::<Vec<_>>();

    let mut proxies = BTreeMap::new();
    let mut errors = BTreeMap::new();
    for task in tasks {
        let (name, proxy) = task.await?;
        match proxy {
            Ok(proxy) => {
                proxies.insert(name, proxy);
            }
            Err(error) => {
                tracing::warn!(%error, mesh = %ctx.name(), dataplane = %name, "Skipping dataplane");
                errors.insert(name, error.to_string());
            }
        }
    }
    tracing::info!(
        mesh = %ctx.name(),
        proxies = proxies.len(),
        errors = errors.len(),
        "Resolved mesh",
    );

    Ok(MeshReport {
        mesh: ctx.name().to_string(),
        endpoints: ctx.endpoint_map.clone(),
        external_services_endpoints: ctx.external_services_endpoint_map.clone(),
        vip_domains: ctx.vip_domains.clone(),
        vip_outbounds: ctx.vip_outbounds.clone(),
        proxies,
        errors,
    })
}
