use super::*;
use crate::select_dataplane_policy;

#[test]
fn most_specific_selector_wins() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web"), ("version", "2")]]);
    let policies = vec![
        mk_traffic_log("all", 3, vec![mk_selector(&[("service", "*")])]),
        mk_traffic_log("web", 1, vec![mk_selector(&[("service", "web")])]),
        mk_traffic_log(
            "web-v1",
            2,
            vec![mk_selector(&[("service", "web"), ("version", "1")])],
        ),
    ];

    let selected = select_dataplane_policy(&dataplane, &policies).expect("policy must be selected");
    assert_eq!(selected.meta.name, "web");
}

#[test]
fn ties_prefer_newest() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let policies = vec![
        mk_traffic_log("a", 1, vec![mk_selector(&[("service", "web")])]),
        mk_traffic_log("b", 2, vec![mk_selector(&[("service", "web")])]),
        mk_traffic_log("c", 2, vec![mk_selector(&[("service", "web")])]),
    ];

    let selected = select_dataplane_policy(&dataplane, &policies).expect("policy must be selected");
    assert_eq!(selected.meta.name, "b");
}

#[test]
fn no_match() {
    let dataplane = mk_dataplane("10.0.0.1", &[&[("service", "web")]]);
    let policies = vec![mk_traffic_log(
        "backend",
        1,
        vec![mk_selector(&[("service", "backend")])],
    )];
    assert!(select_dataplane_policy(&dataplane, &policies).is_none());
    assert!(select_dataplane_policy::<Resource<TrafficLog>>(&dataplane, &[]).is_none());
}
