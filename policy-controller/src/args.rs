use crate::{
    api::Registry,
    report::report,
    snapshot::Snapshot,
    topology::{MeshContextBuilder, Metrics, ResolverConfig, SystemResolver},
};
use anyhow::{bail, Result};
use clap::Parser;
use ipnet::IpNet;
use std::{collections::BTreeMap, io::Write, path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "mesh-policy",
    about = "Resolves the policies and topology of every dataplane in a resource snapshot"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "mesh=info,warn",
        env = "MESH_POLICY_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    /// The zone to resolve for. Ingresses of other zones expose their
    /// services as remote endpoints.
    #[clap(long, default_value = "")]
    zone: String,

    #[clap(long, default_value = "mesh")]
    dns_domain: String,

    /// The port proxies listen on for each virtual address.
    #[clap(long, default_value = "80")]
    vip_port: u16,

    #[clap(long, default_value = "240.0.0.0/4")]
    vip_cidr: IpNet,

    /// A JSON file listing the resources to resolve.
    #[clap(long)]
    snapshot: PathBuf,

    /// Resolves only this mesh. All meshes are resolved by default.
    #[clap(long)]
    mesh: Option<String>,

    /// Writes Prometheus metrics to stderr when done.
    #[clap(long)]
    print_metrics: bool,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            zone,
            dns_domain,
            vip_port,
            vip_cidr,
            snapshot,
            mesh,
            print_metrics,
        } = self;

        log_format.try_init(log_level)?;

        let registry = Arc::new(Registry::with_builtin_kinds());
        let store = Snapshot::load(&snapshot)?.into_store(registry.clone())?;

        let mut prom = <prometheus_client::registry::Registry>::default();
        let metrics = Metrics::register(prom.sub_registry_with_prefix("mesh_policy"));

        let config = ResolverConfig {
            zone,
            dns_domain,
            vip_port,
            vip_cidr,
        };
        let builder =
            MeshContextBuilder::new(store, SystemResolver::from_system_conf()?, registry, config)
                .with_metrics(metrics);

        let meshes = match mesh {
            Some(mesh) => vec![mesh],
            None => builder.meshes().await?,
        };
        info!(meshes = meshes.len(), "Resolving");

        let mut reports = BTreeMap::new();
        let mut failed = Vec::new();
        for mesh in meshes {
            match builder.build(&mesh).await {
                Ok(ctx) => {
                    reports.insert(mesh, report(Arc::new(ctx)).await?);
                }
                Err(_) => failed.push(mesh),
            }
        }

        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &reports)?;
        writeln!(stdout)?;

        if print_metrics {
            let mut buf = String::new();
            prometheus_client::encoding::text::encode(&mut buf, &prom)?;
            eprint!("{buf}");
        }

        if !failed.is_empty() {
            bail!("failed to resolve meshes: {}", failed.join(", "));
        }
        Ok(())
    }
}
