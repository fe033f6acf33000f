use ipnet::IpNet;
use mesh_policy_controller_api::{
    dataplane::Outbound, tags::SERVICE_TAG, Dataplane, ExternalService, Resource, TagSet,
    ZoneIngress,
};
use mesh_policy_controller_core::VipDomains;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    collections::{BTreeMap, BTreeSet},
    net::IpAddr,
};

/// The kind of name a virtual address is allocated for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryType {
    Service,
    Host,
    Fqdn,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostnameEntry {
    pub entry_type: EntryType,
    pub name: String,
}

/// A port and tag set reachable through a virtual address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEntry {
    pub port: u16,
    pub tags: TagSet,
    /// Describes the resource that produced this entry.
    pub origin: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualOutbound {
    pub address: Option<IpAddr>,
    pub outbounds: Vec<OutboundEntry>,
}

/// The virtual outbounds of a mesh, keyed by hostname entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualOutboundMeshView {
    entries: BTreeMap<HostnameEntry, VirtualOutbound>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum VipError {
    #[error("{entry} already has an outbound on port {port} with different tags")]
    Conflict { entry: HostnameEntry, port: u16 },

    #[error("no virtual addresses left in {0}")]
    Exhausted(IpNet),
}

/// Origin of entries for services exposed by dataplane inbounds.
pub const ORIGIN_INBOUND: &str = "dataplane";

/// Origin of entries for services exposed by remote zone ingresses.
pub const ORIGIN_INGRESS: &str = "zone-ingress";

/// Origin prefix of entries for external services.
pub const ORIGIN_EXTERNAL_SERVICE: &str = "external-service";

// === impl HostnameEntry ===

impl HostnameEntry {
    pub fn service(name: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::Service,
            name: name.into(),
        }
    }

    pub fn host(name: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::Host,
            name: name.into(),
        }
    }

    pub fn fqdn(name: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::Fqdn,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for HostnameEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.entry_type {
            EntryType::Service => "service",
            EntryType::Host => "host",
            EntryType::Fqdn => "fqdn",
        };
        write!(f, "{}:{}", prefix, self.name)
    }
}

// === impl VirtualOutboundMeshView ===

impl VirtualOutboundMeshView {
    /// Adds an outbound to an entry. Adding the same port and tags twice is a
    /// no-op; reusing a port with other tags is an error.
    pub fn add(&mut self, entry: HostnameEntry, outbound: OutboundEntry) -> Result<(), VipError> {
        let vob = self.entries.entry(entry.clone()).or_default();
        if let Some(existing) = vob.outbounds.iter().find(|o| o.port == outbound.port) {
            if existing.tags == outbound.tags {
                return Ok(());
            }
            return Err(VipError::Conflict {
                entry,
                port: outbound.port,
            });
        }
        vob.outbounds.push(outbound);
        Ok(())
    }

    pub fn set_address(&mut self, entry: HostnameEntry, address: IpAddr) {
        self.entries.entry(entry).or_default().address = Some(address);
    }

    pub fn get(&self, entry: &HostnameEntry) -> Option<&VirtualOutbound> {
        self.entries.get(entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HostnameEntry, &VirtualOutbound)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assigns an address from `cidr` to every entry without one, in entry
    /// order, skipping addresses already in use.
    pub fn allocate(&mut self, cidr: IpNet) -> Result<(), VipError> {
        let mut used = self
            .entries
            .values()
            .filter_map(|vob| vob.address)
            .collect::<BTreeSet<_>>();
        let mut hosts = cidr.hosts();
        for vob in self.entries.values_mut() {
            if vob.address.is_some() {
                continue;
            }
            let address = hosts
                .by_ref()
                .find(|ip| !used.contains(ip))
                .ok_or(VipError::Exhausted(cidr))?;
            used.insert(address);
            vob.address = Some(address);
        }
        Ok(())
    }
}

/// Builds a mesh's virtual outbounds from the services its dataplanes, remote
/// zone ingresses and external services expose. Conflicting entries are
/// logged and skipped.
pub fn build_virtual_outbound_view(
    mesh: &str,
    local_zone: &str,
    dataplanes: &[Resource<Dataplane>],
    zone_ingresses: &[Resource<ZoneIngress>],
    external_services: &[Resource<ExternalService>],
) -> VirtualOutboundMeshView {
    let mut view = VirtualOutboundMeshView::default();
    let mut add = |entry: HostnameEntry, outbound: OutboundEntry| {
        if let Err(error) = view.add(entry, outbound) {
            tracing::warn!(%error, mesh, "Skipping virtual outbound");
        }
    };

    for dataplane in dataplanes.iter().filter(|dp| !dp.spec.is_ingress()) {
        for inbound in dataplane.spec.networking.inbound.iter() {
            if let Some(service) = inbound.tags.service() {
                add(
                    HostnameEntry::service(service),
                    service_outbound(service, 0, ORIGIN_INBOUND),
                );
            }
        }
    }

    let ingress_dataplanes = dataplanes.iter().filter_map(|dp| {
        let ingress = dp.spec.networking.ingress.as_ref()?;
        Some((
            dp.spec.zone().unwrap_or_default(),
            ingress.available_services.as_slice(),
        ))
    });
    let ingresses = zone_ingresses
        .iter()
        .map(|zi| (zi.spec.zone.as_str(), zi.spec.available_services.as_slice()));
    for (zone, services) in ingress_dataplanes.chain(ingresses) {
        if zone.is_empty() || zone == local_zone {
            continue;
        }
        for service in services.iter().filter(|s| s.mesh == mesh) {
            if let Some(name) = service.tags.service() {
                add(
                    HostnameEntry::service(name),
                    service_outbound(name, 0, ORIGIN_INGRESS),
                );
            }
        }
    }

    for es in external_services.iter() {
        let (Some(service), Some((host, port))) = (es.spec.service(), es.spec.host_port()) else {
            continue;
        };
        let origin = format!("{}:{}", ORIGIN_EXTERNAL_SERVICE, es.meta.name);
        add(
            HostnameEntry::service(service),
            service_outbound(service, port, &origin),
        );
        if !es.spec.networking.disable_host_dns_entry {
            add(
                HostnameEntry::host(host),
                service_outbound(service, port, &origin),
            );
        }
    }

    view
}

fn service_outbound(service: &str, port: u16, origin: &str) -> OutboundEntry {
    OutboundEntry {
        port,
        tags: Some((SERVICE_TAG, service)).into_iter().collect(),
        origin: origin.to_string(),
    }
}

/// Computes the DNS domains of each virtual address and the outbounds
/// proxies should listen on.
///
/// If no outbound of an entry uses `vip_port`, an additional outbound on
/// `vip_port` is emitted with the tags of the entry's first outbound.
pub fn vip_outbounds(
    view: &VirtualOutboundMeshView,
    tld: &str,
    vip_port: u16,
) -> (Vec<VipDomains>, Vec<Outbound>) {
    let mut domains = Vec::new();
    let mut outbounds = Vec::new();

    for (entry, vob) in view.iter() {
        let Some(address) = vob.address else {
            continue;
        };

        let names = match entry.entry_type {
            EntryType::Service => service_domains(&entry.name, tld),
            EntryType::Host | EntryType::Fqdn if is_dns_name(&entry.name) => {
                vec![entry.name.clone()]
            }
            EntryType::Host | EntryType::Fqdn => Vec::new(),
        };
        if !names.is_empty() {
            domains.push(VipDomains {
                address,
                domains: names,
            });
        }

        let mut has_vip_port = false;
        for ob in vob.outbounds.iter() {
            if ob.port == vip_port {
                has_vip_port = true;
            }
            if ob.port != 0 {
                outbounds.push(mk_outbound(address, ob.port, &ob.tags));
            }
        }
        if !has_vip_port {
            if let Some(first) = vob.outbounds.first() {
                outbounds.push(mk_outbound(address, vip_port, &first.tags));
            }
        }
    }

    (domains, outbounds)
}

fn mk_outbound(address: IpAddr, port: u16, tags: &TagSet) -> Outbound {
    Outbound {
        address: Some(address),
        port,
        service: None,
        tags: tags.clone(),
    }
}

/// Returns the domains a service is known by: `<service>.<tld>` and, when
/// the service name contains underscores, the same name with underscores
/// replaced by dots.
pub fn service_domains(service: &str, tld: &str) -> Vec<String> {
    let raw = format!("{service}.{tld}");
    let dotted = format!("{}.{tld}", service.replace('_', "."));
    if raw == dotted {
        vec![raw]
    } else {
        vec![raw, dotted]
    }
}

pub fn is_dns_name(name: &str) -> bool {
    static DNS_NAME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^([a-zA-Z0-9_][a-zA-Z0-9_-]{0,62})(\.[a-zA-Z0-9_][a-zA-Z0-9_-]{0,62})*[._]?$",
        )
        .expect("DNS name pattern must compile")
    });

    if name.is_empty() || name.len() > 255 || name.parse::<IpAddr>().is_ok() {
        return false;
    }
    DNS_NAME.is_match(name)
}
