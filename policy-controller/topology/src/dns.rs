use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use mesh_policy_controller_api::{Dataplane, Resource, ZoneIngress};
use std::net::IpAddr;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("failed to resolve {host}: {reason}")]
    Lookup { host: String, reason: String },

    #[error("{host} did not resolve to any addresses")]
    NoAddresses { host: String },
}

/// Resolves hostnames to IP addresses.
#[async_trait::async_trait]
pub trait LookupIp: Send + Sync {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolves hostnames with the system's DNS configuration.
#[derive(Clone)]
pub struct SystemResolver(TokioResolver);

/// Adapts a function into a [`LookupIp`].
#[derive(Clone, Debug)]
pub struct LookupFn<F>(F);

pub fn lookup_fn<F>(f: F) -> LookupFn<F>
where
    F: Fn(&str) -> Result<Vec<IpAddr>, ResolveError> + Send + Sync,
{
    LookupFn(f)
}

/// Resolves an address that may be a hostname.
///
/// Literal IPs and empty addresses are returned as-is. When a hostname
/// resolves to several addresses, the smallest in string order is chosen so
/// that repeated resolutions agree.
pub async fn resolve_address<L: LookupIp + ?Sized>(
    lookup: &L,
    address: &str,
) -> Result<String, ResolveError> {
    if address.is_empty() || address.parse::<IpAddr>().is_ok() {
        return Ok(address.to_string());
    }

    let ips = lookup.lookup_ip(address).await?;
    ips.iter()
        .map(|ip| ip.to_string())
        .min()
        .ok_or_else(|| ResolveError::NoAddresses {
            host: address.to_string(),
        })
}

/// Returns a copy of the dataplane with its address and advertised address
/// resolved. The given dataplane is not modified.
pub async fn resolve_dataplane_address<L: LookupIp + ?Sized>(
    lookup: &L,
    dataplane: &Resource<Dataplane>,
) -> Result<Resource<Dataplane>, ResolveError> {
    let networking = &dataplane.spec.networking;
    let address = resolve_address(lookup, &networking.address).await?;
    let advertised_address = match networking.advertised_address.as_deref() {
        Some(advertised) => Some(resolve_address(lookup, advertised).await?),
        None => None,
    };

    let mut resolved = dataplane.clone();
    resolved.spec.networking.address = address;
    resolved.spec.networking.advertised_address = advertised_address;
    Ok(resolved)
}

/// Returns a copy of the zone ingress with its advertised address resolved.
pub async fn resolve_zone_ingress_address<L: LookupIp + ?Sized>(
    lookup: &L,
    ingress: &Resource<ZoneIngress>,
) -> Result<Resource<ZoneIngress>, ResolveError> {
    let mut resolved = ingress.clone();
    if let Some(advertised) = ingress.spec.networking.advertised_address.as_deref() {
        resolved.spec.networking.advertised_address =
            Some(resolve_address(lookup, advertised).await?);
    }
    Ok(resolved)
}

// === impl SystemResolver ===

impl SystemResolver {
    pub fn new(config: ResolverConfig, opts: ResolverOpts) -> Self {
        let mut rb = hickory_resolver::Resolver::builder_with_config(
            config,
            TokioConnectionProvider::default(),
        );
        *rb.options_mut() = opts;
        Self(rb.build())
    }

    /// Reads the resolver configuration from the host, e.g. `/etc/resolv.conf`.
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        let (config, opts) =
            hickory_resolver::system_conf::read_system_conf().map_err(|error| {
                ResolveError::Lookup {
                    host: String::new(),
                    reason: error.to_string(),
                }
            })?;
        Ok(Self::new(config, opts))
    }
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl LookupIp for SystemResolver {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = self
            .0
            .lookup_ip(host)
            .await
            .map_err(|error| ResolveError::Lookup {
                host: host.to_string(),
                reason: error.to_string(),
            })?;
        Ok(lookup.iter().collect())
    }
}

// === impl LookupFn ===

#[async_trait::async_trait]
impl<F> LookupIp for LookupFn<F>
where
    F: Fn(&str) -> Result<Vec<IpAddr>, ResolveError> + Send + Sync,
{
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        (self.0)(host)
    }
}

#[async_trait::async_trait]
impl<L: LookupIp + ?Sized> LookupIp for std::sync::Arc<L> {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        (**self).lookup_ip(host).await
    }
}
