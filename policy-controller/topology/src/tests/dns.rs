use super::*;
use crate::dns::{
    lookup_fn, resolve_address, resolve_dataplane_address, resolve_zone_ingress_address,
    ResolveError,
};
use std::{
    net::IpAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

fn example_com(host: &str) -> Result<Vec<IpAddr>, ResolveError> {
    match host {
        "example.com" => Ok(vec![
            "192.168.1.2".parse().unwrap(),
            "192.168.1.1".parse().unwrap(),
        ]),
        "empty.example.com" => Ok(vec![]),
        _ => Err(ResolveError::Lookup {
            host: host.to_string(),
            reason: "no such host".to_string(),
        }),
    }
}

#[tokio::test]
async fn resolves_to_smallest_address() {
    let resolved = resolve_address(&lookup_fn(example_com), "example.com")
        .await
        .expect("example.com must resolve");
    assert_eq!(resolved, "192.168.1.1");
}

#[tokio::test]
async fn literal_addresses_are_not_looked_up() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let lookup = lookup_fn({
        let lookups = lookups.clone();
        move |host: &str| {
            lookups.fetch_add(1, Ordering::SeqCst);
            example_com(host)
        }
    });

    for address in ["10.0.0.1", "fd00::1", ""] {
        let resolved = resolve_address(&lookup, address).await.unwrap();
        assert_eq!(resolved, address);
    }
    assert_eq!(lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lookup_failures_are_reported() {
    let lookup = lookup_fn(example_com);
    assert_eq!(
        resolve_address(&lookup, "unknown.example.com").await,
        Err(ResolveError::Lookup {
            host: "unknown.example.com".to_string(),
            reason: "no such host".to_string(),
        })
    );
    assert_eq!(
        resolve_address(&lookup, "empty.example.com").await,
        Err(ResolveError::NoAddresses {
            host: "empty.example.com".to_string(),
        })
    );
}

#[tokio::test]
async fn resolves_a_copy_of_the_dataplane() {
    let mut dataplane = mk_dataplane("web", "example.com", &[&[("service", "web")]]);
    dataplane.spec.networking.advertised_address = Some("example.com".to_string());

    let resolved = resolve_dataplane_address(&lookup_fn(example_com), &dataplane)
        .await
        .expect("dataplane must resolve");
    assert_eq!(resolved.spec.networking.address, "192.168.1.1");
    assert_eq!(
        resolved.spec.networking.advertised_address.as_deref(),
        Some("192.168.1.1")
    );
    assert_eq!(dataplane.spec.networking.address, "example.com");
    assert_eq!(resolved.meta, dataplane.meta);
}

#[tokio::test]
async fn unresolvable_dataplanes_fail() {
    let dataplane = mk_dataplane("web", "nowhere.example.com", &[&[("service", "web")]]);
    let error = resolve_dataplane_address(&lookup_fn(example_com), &dataplane)
        .await
        .expect_err("dataplane must not resolve");
    assert!(matches!(error, ResolveError::Lookup { host, .. } if host == "nowhere.example.com"));
}

#[tokio::test]
async fn resolves_zone_ingress_advertised_address() {
    let ingress = mk_zone_ingress("zi", "zone-2", Some(("example.com", 10001)), vec![]);
    let resolved = resolve_zone_ingress_address(&lookup_fn(example_com), &ingress)
        .await
        .expect("ingress must resolve");
    assert_eq!(
        resolved.spec.public_address(),
        Some(("192.168.1.1", 10001))
    );
    assert_eq!(
        ingress.spec.networking.advertised_address.as_deref(),
        Some("example.com")
    );
}
