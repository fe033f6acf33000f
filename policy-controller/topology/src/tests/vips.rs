use super::*;
use crate::vips::{
    build_virtual_outbound_view, is_dns_name, service_domains, vip_outbounds, HostnameEntry,
    OutboundEntry, VipError, VirtualOutboundMeshView, ORIGIN_INBOUND,
};
use ipnet::IpNet;
use mesh_policy_controller_core::VipDomains;
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid IP")
}

fn entry(port: u16, service: &str) -> OutboundEntry {
    OutboundEntry {
        port,
        tags: mk_tags(&[("service", service)]),
        origin: "test".to_string(),
    }
}

#[test]
fn synthesizes_vip_port_outbound() {
    let mut view = VirtualOutboundMeshView::default();
    let svc = HostnameEntry::service("example_svc_80");
    view.add(svc.clone(), entry(0, "example_svc_80")).unwrap();
    view.set_address(svc, ip("240.0.0.1"));

    let (domains, outbounds) = vip_outbounds(&view, "mesh", 80);
    assert_eq!(
        domains,
        vec![VipDomains {
            address: ip("240.0.0.1"),
            domains: vec![
                "example_svc_80.mesh".to_string(),
                "example.svc.80.mesh".to_string()
            ],
        }]
    );
    assert_eq!(outbounds.len(), 1);
    assert_eq!(outbounds[0].address, Some(ip("240.0.0.1")));
    assert_eq!(outbounds[0].port, 80);
    assert_eq!(outbounds[0].tags, mk_tags(&[("service", "example_svc_80")]));
}

#[test]
fn explicit_ports_are_kept() {
    let mut view = VirtualOutboundMeshView::default();
    let host = HostnameEntry::host("httpbin.org");
    view.add(host.clone(), entry(443, "httpbin")).unwrap();
    view.add(host.clone(), entry(80, "httpbin-plain")).unwrap();
    view.set_address(host, ip("240.0.0.2"));

    let (domains, outbounds) = vip_outbounds(&view, "mesh", 80);
    assert_eq!(domains[0].domains, vec!["httpbin.org".to_string()]);
    assert_eq!(
        outbounds
            .iter()
            .map(|o| (o.port, o.tags.service()))
            .collect::<Vec<_>>(),
        vec![(443, Some("httpbin")), (80, Some("httpbin-plain"))]
    );
}

#[test]
fn entries_without_addresses_are_not_emitted() {
    let mut view = VirtualOutboundMeshView::default();
    view.add(HostnameEntry::service("backend"), entry(0, "backend"))
        .expect("entry must be added");

    let (domains, outbounds) = vip_outbounds(&view, "mesh", 80);
    assert!(domains.is_empty());
    assert!(outbounds.is_empty());
}

#[test]
fn invalid_host_names_get_no_domains() {
    let mut view = VirtualOutboundMeshView::default();
    let host = HostnameEntry::host("not a host!");
    view.add(host.clone(), entry(8080, "odd")).unwrap();
    view.set_address(host, ip("240.0.0.3"));

    let (domains, outbounds) = vip_outbounds(&view, "mesh", 80);
    assert!(domains.is_empty());
    assert_eq!(outbounds.len(), 2);
}

#[test]
fn conflicting_ports_are_rejected() {
    let mut view = VirtualOutboundMeshView::default();
    let svc = HostnameEntry::service("backend");
    view.add(svc.clone(), entry(8080, "backend")).unwrap();
    view.add(svc.clone(), entry(8080, "backend")).unwrap();
    assert_eq!(
        view.add(svc.clone(), entry(8080, "other")),
        Err(VipError::Conflict {
            entry: svc.clone(),
            port: 8080,
        })
    );
    assert_eq!(view.get(&svc).map(|v| v.outbounds.len()), Some(1));
}

#[test]
fn allocates_addresses_in_entry_order() {
    let mut view = VirtualOutboundMeshView::default();
    view.add(HostnameEntry::service("b"), entry(0, "b")).unwrap();
    view.add(HostnameEntry::service("a"), entry(0, "a")).unwrap();
    view.add(HostnameEntry::service("c"), entry(0, "c")).unwrap();
    view.set_address(HostnameEntry::service("c"), ip("240.0.0.1"));

    let cidr = "240.0.0.0/24".parse::<IpNet>().unwrap();
    view.allocate(cidr).expect("addresses must be allocated");
    let addr = |name: &str| view.get(&HostnameEntry::service(name)).unwrap().address;
    assert_eq!(addr("a"), Some(ip("240.0.0.2")));
    assert_eq!(addr("b"), Some(ip("240.0.0.3")));
    assert_eq!(addr("c"), Some(ip("240.0.0.1")));
}

#[test]
fn allocation_reports_exhaustion() {
    let mut view = VirtualOutboundMeshView::default();
    for name in ["a", "b", "c"] {
        view.add(HostnameEntry::service(name), entry(0, name))
            .expect("entry must be added");
    }
    let cidr = "240.0.0.0/30".parse::<IpNet>().unwrap();
    assert_eq!(view.allocate(cidr), Err(VipError::Exhausted(cidr)));
}

#[test]
fn builds_view_from_mesh_resources() {
    let dataplanes = vec![
        mk_dataplane("backend", "10.0.0.1", &[&[("service", "backend")]]),
        mk_dataplane("web", "10.0.0.2", &[&[("service", "web")]]),
    ];
    let ingresses = vec![
        mk_zone_ingress(
            "remote",
            "zone-2",
            Some(("192.168.0.1", 10001)),
            vec![mk_available("payments", 1)],
        ),
        mk_zone_ingress(
            "local",
            "zone-1",
            Some(("192.168.0.2", 10001)),
            vec![mk_available("local-only", 1)],
        ),
    ];
    let mut hidden = mk_external_service(
        "hidden",
        "hidden.example:443",
        &[("service", "hidden")],
        true,
    );
    hidden.spec.networking.disable_host_dns_entry = true;
    let external = vec![
        mk_external_service(
            "httpbin",
            "httpbin.org:443",
            &[("service", "httpbin")],
            true,
        ),
        hidden,
    ];

    let view =
        build_virtual_outbound_view("default", "zone-1", &dataplanes, &ingresses, &external);

    let backend = view.get(&HostnameEntry::service("backend")).unwrap();
    assert_eq!(backend.outbounds[0].port, 0);
    assert_eq!(backend.outbounds[0].origin, ORIGIN_INBOUND);
    assert!(view.get(&HostnameEntry::service("web")).is_some());
    assert!(view.get(&HostnameEntry::service("payments")).is_some());
    assert!(view.get(&HostnameEntry::service("local-only")).is_none());

    let httpbin = view.get(&HostnameEntry::host("httpbin.org")).unwrap();
    assert_eq!(httpbin.outbounds[0].port, 443);
    assert_eq!(httpbin.outbounds[0].origin, "external-service:httpbin");
    assert!(view.get(&HostnameEntry::service("httpbin")).is_some());
    assert!(view.get(&HostnameEntry::service("hidden")).is_some());
    assert!(view.get(&HostnameEntry::host("hidden.example")).is_none());
}

#[test]
fn service_domain_variants() {
    assert_eq!(service_domains("backend", "mesh"), vec!["backend.mesh"]);
    assert_eq!(
        service_domains("backend_default_svc_8080", "mesh"),
        vec!["backend_default_svc_8080.mesh", "backend.default.svc.8080.mesh"]
    );
}

#[test]
fn dns_name_validation() {
    for name in ["httpbin.org", "a", "my-service.ns.svc.cluster.local", "host."] {
        assert!(is_dns_name(name), "{name} should be a DNS name");
    }
    for name in ["", "10.0.0.1", "::1", "not a host", "-leading.dash", "a..b"] {
        assert!(!is_dns_name(name), "{name} should not be a DNS name");
    }
}
