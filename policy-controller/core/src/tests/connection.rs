use super::*;
use crate::{outbound::DestinationMap, select_connection_policies, TagSelectorSet};
use maplit::btreemap;

fn mk_destinations(services: &[&str]) -> DestinationMap {
    services
        .iter()
        .map(|s| {
            (
                s.to_string(),
                Some(Selector::service(*s)).into_iter().collect::<TagSelectorSet>(),
            )
        })
        .collect()
}

fn selected_names<P: crate::Policy>(
    selected: std::collections::BTreeMap<String, &P>,
) -> std::collections::BTreeMap<String, String> {
    selected
        .into_iter()
        .map(|(service, p)| (service, p.name().to_string()))
        .collect()
}

#[test]
fn more_specific_source_wins() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web"), ("version", "1.0")]]);
    let destinations = mk_destinations(&["backend"]);
    let policies = vec![
        mk_health_check(
            "p1",
            1,
            vec![mk_selector(&[("service", "*")])],
            vec![mk_selector(&[("service", "backend")])],
        ),
        mk_health_check(
            "p2",
            1,
            vec![mk_selector(&[("service", "web"), ("version", "1.0")])],
            vec![mk_selector(&[("service", "backend")])],
        ),
    ];

    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(
        selected_names(selected),
        btreemap! { "backend".to_string() => "p2".to_string() }
    );
}

#[test]
fn equal_rank_prefers_newest() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let destinations = mk_destinations(&["backend"]);
    let mk = |name: &str, created: i64| {
        mk_health_check(
            name,
            created,
            vec![mk_selector(&[("service", "web")])],
            vec![mk_selector(&[("service", "backend")])],
        )
    };

    let policies = [mk("old", 1), mk("new", 2)];
    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(selected["backend"].name(), "new");

    // Listing order doesn't matter.
    let policies = [mk("new", 2), mk("old", 1)];
    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(selected["backend"].name(), "new");
}

#[test]
fn identical_policies_prefer_first_name() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let destinations = mk_destinations(&["backend"]);
    let mk = |name: &str| {
        mk_health_check(
            name,
            1,
            vec![mk_selector(&[("service", "*")])],
            vec![mk_selector(&[("service", "*")])],
        )
    };

    let policies = [mk("b"), mk("a")];
    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(selected["backend"].name(), "a");
}

#[test]
fn exact_destination_outranks_wildcards() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web"), ("version", "1")]]);
    let destinations = btreemap! {
        "backend".to_string() => vec![
            mk_selector(&[("service", "backend"), ("version", "2"), ("region", "eu")]),
        ].into_iter().collect::<TagSelectorSet>(),
    };
    let policies = vec![
        mk_health_check(
            "exact",
            1,
            vec![mk_selector(&[("service", "*")])],
            vec![mk_selector(&[("service", "backend")])],
        ),
        mk_health_check(
            "wildcards",
            2,
            vec![mk_selector(&[("service", "*")])],
            vec![mk_selector(&[
                ("service", "*"),
                ("version", "*"),
                ("region", "*"),
            ])],
        ),
    ];

    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(selected["backend"].name(), "exact");
}

#[test]
fn unmatched_services_are_omitted() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let destinations = mk_destinations(&["backend", "redis"]);
    let policies = vec![mk_health_check(
        "backend-only",
        1,
        vec![mk_selector(&[("service", "web")])],
        vec![mk_selector(&[("service", "backend")])],
    )];

    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(
        selected_names(selected),
        btreemap! { "backend".to_string() => "backend-only".to_string() }
    );
}

#[test]
fn sources_must_match_the_dataplane() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let destinations = mk_destinations(&["backend"]);
    let policies = vec![mk_health_check(
        "other-source",
        1,
        vec![mk_selector(&[("service", "admin")])],
        vec![mk_selector(&[("service", "*")])],
    )];

    assert!(select_connection_policies(&dataplane, &destinations, &policies).is_empty());
}

#[test]
fn any_inbound_may_match() {
    let dataplane = mk_dataplane(
        "10.0.0.1",
        &[&[("service", "web")], &[("service", "metrics")]],
    );
    let destinations = mk_destinations(&["backend"]);
    let policies = vec![mk_health_check(
        "metrics",
        1,
        vec![mk_selector(&[("service", "metrics")])],
        vec![mk_selector(&[("service", "backend")])],
    )];

    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(selected["backend"].name(), "metrics");
}

#[test]
fn gateway_tags_match_sources() {
    let dataplane = mk_gateway(&[("service", "edge")]);
    let destinations = mk_destinations(&["backend"]);
    let policies = vec![mk_health_check(
        "edge",
        1,
        vec![mk_selector(&[("service", "edge")])],
        vec![mk_selector(&[("service", "backend")])],
    )];

    let selected = select_connection_policies(&dataplane, &destinations, &policies);
    assert_eq!(selected["backend"].name(), "edge");
}

#[test]
fn empty_inputs() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let policies = vec![mk_health_check(
        "all",
        1,
        vec![mk_selector(&[("service", "*")])],
        vec![mk_selector(&[("service", "*")])],
    )];

    assert!(select_connection_policies(&dataplane, &DestinationMap::new(), &policies).is_empty());
    assert!(select_connection_policies::<Resource<HealthCheck>>(
        &dataplane,
        &mk_destinations(&["backend"]),
        &[]
    )
    .is_empty());
}
