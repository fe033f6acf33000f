use super::*;
use crate::{
    policies::{
        build_health_check_map, build_retry_map, build_traffic_permission_map, select_gateway,
        select_traffic_log,
    },
    routes::{build_destination_map, build_route_map},
};
use mesh_policy_controller_api::{
    dataplane::DataplaneGateway,
    policy::{Gateway, HealthCheck, Retry, TrafficLog, TrafficPermission},
    InboundInterface,
};

fn mk_health_check(
    name: &str,
    created: i64,
    sources: Vec<Selector>,
    destinations: Vec<Selector>,
) -> Resource<HealthCheck> {
    Resource::new(
        ResourceMeta::new("default", name).with_creation_time(mk_time(created)),
        HealthCheck {
            sources,
            destinations,
            ..Default::default()
        },
    )
}

#[test]
fn selects_health_check_per_destination() {
    let dataplane = with_outbounds(
        mk_dataplane(
            "backend",
            "10.0.0.1",
            &[&[("service", "backend"), ("region", "eu")]],
        ),
        &[(10001, &[("service", "redis")])],
    );
    let health_checks = vec![
        mk_health_check(
            "p1",
            1,
            vec![mk_selector(&[("service", "*")])],
            vec![mk_selector(&[("service", "redis")])],
        ),
        mk_health_check(
            "p2",
            1,
            vec![mk_selector(&[("service", "backend"), ("region", "eu")])],
            vec![mk_selector(&[("service", "redis")])],
        ),
    ];

    let routes = build_route_map(&dataplane.spec, &[]);
    let destinations = build_destination_map(&dataplane.spec, &routes);
    let selected = build_health_check_map(&dataplane.spec, &destinations, &health_checks);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected["redis"].meta.name, "p2");
}

#[test]
fn unmatched_destinations_have_no_policy() {
    let dataplane = with_outbounds(
        mk_dataplane("web", "10.0.0.1", &[&[("service", "web")]]),
        &[(10001, &[("service", "redis")]), (10002, &[("service", "db")])],
    );
    let retries = vec![Resource::new(
        ResourceMeta::new("default", "retry-db"),
        Retry {
            sources: vec![mk_selector(&[("service", "web")])],
            destinations: vec![mk_selector(&[("service", "db")])],
            ..Default::default()
        },
    )];

    let destinations = build_destination_map(&dataplane.spec, &Default::default());
    let selected = build_retry_map(&dataplane.spec, &destinations, &retries);
    assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["db"]);
}

#[test]
fn traffic_permissions_apply_per_inbound() {
    let dataplane = mk_dataplane(
        "backend",
        "10.0.0.1",
        &[&[("service", "backend")], &[("service", "metrics")]],
    );
    let permissions = vec![
        Resource::new(
            ResourceMeta::new("default", "allow-all"),
            TrafficPermission {
                sources: vec![mk_selector(&[("service", "*")])],
                destinations: vec![mk_selector(&[("service", "*")])],
            },
        ),
        Resource::new(
            ResourceMeta::new("default", "allow-web"),
            TrafficPermission {
                sources: vec![mk_selector(&[("service", "web")])],
                destinations: vec![mk_selector(&[("service", "backend")])],
            },
        ),
    ];

    let selected = build_traffic_permission_map(&dataplane.spec, &permissions);
    let names = selected
        .iter()
        .map(|(iface, p)| (iface.clone(), p.meta.name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            (
                InboundInterface {
                    address: "10.0.0.1".to_string(),
                    port: 8080,
                },
                "allow-web"
            ),
            (
                InboundInterface {
                    address: "10.0.0.1".to_string(),
                    port: 8081,
                },
                "allow-all"
            ),
        ]
    );
}

#[test]
fn selects_traffic_log_for_dataplane() {
    let dataplane = mk_dataplane("web", "10.0.0.1", &[&[("service", "web")]]);
    let logs = vec![
        Resource::new(
            ResourceMeta::new("default", "all"),
            TrafficLog {
                selectors: vec![mk_selector(&[("service", "*")])],
                ..Default::default()
            },
        ),
        Resource::new(
            ResourceMeta::new("default", "web"),
            TrafficLog {
                selectors: vec![mk_selector(&[("service", "web")])],
                ..Default::default()
            },
        ),
    ];

    let selected = select_traffic_log(&dataplane.spec, &logs).expect("a log must be selected");
    assert_eq!(selected.meta.name, "web");
    assert!(select_traffic_log(&dataplane.spec, &[]).is_none());
}

#[test]
fn gateways_only_configure_gateway_dataplanes() {
    let gateways = vec![Resource::new(
        ResourceMeta::new("default", "edge"),
        Gateway {
            selectors: vec![mk_selector(&[("service", "edge")])],
            ..Default::default()
        },
    )];

    let regular = mk_dataplane("edge", "10.0.0.1", &[&[("service", "edge")]]);
    assert!(select_gateway(&regular.spec, &gateways).is_none());

    let mut gateway = mk_dataplane("edge", "10.0.0.1", &[]);
    gateway.spec.networking.gateway = Some(DataplaneGateway {
        tags: mk_tags(&[("service", "edge")]),
    });
    let selected = select_gateway(&gateway.spec, &gateways).expect("gateway must be selected");
    assert_eq!(selected.meta.name, "edge");
}
