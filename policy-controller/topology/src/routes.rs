use mesh_policy_controller_api::{
    policy::TrafficRoute, Dataplane, OutboundInterface, Resource, Selector, TagSet,
};
use mesh_policy_controller_core::{select_connection_policies, DestinationMap, TagSelectorSet};
use std::collections::BTreeMap;

/// The route selected for each of a dataplane's outbounds.
pub type RouteMap = BTreeMap<OutboundInterface, Resource<TrafficRoute>>;

/// Selects the most specific route for each of a dataplane's outbounds.
///
/// Each outbound is matched as `service=<name>`. The selected route is copied
/// and its split destinations are narrowed to the outbound's tags, so the
/// shared route is never modified.
pub fn build_route_map(dataplane: &Dataplane, routes: &[Resource<TrafficRoute>]) -> RouteMap {
    let outbounds = &dataplane.networking.outbound;
    if outbounds.is_empty() || routes.is_empty() {
        return RouteMap::new();
    }

    let services = outbounds
        .iter()
        .filter_map(|o| o.service())
        .map(|service| {
            let selectors = Some(Selector::service(service))
                .into_iter()
                .collect::<TagSelectorSet>();
            (service.to_string(), selectors)
        })
        .collect::<DestinationMap>();
    let selected = select_connection_policies(dataplane, &services, routes);

    let mut route_map = RouteMap::new();
    for outbound in outbounds.iter() {
        let Some(service) = outbound.service() else {
            tracing::debug!(port = outbound.port, "Outbound has no service");
            continue;
        };
        if let Some(route) = selected.get(service) {
            route_map.insert(outbound.interface(), narrowed(route, &outbound.tags()));
        }
    }
    route_map
}

/// Builds the set of selectors each outbound may route to.
///
/// Outbounds with a route contribute their route's split destinations, keyed
/// by each destination's service. Outbounds without a route contribute their
/// own service.
pub fn build_destination_map(dataplane: &Dataplane, routes: &RouteMap) -> DestinationMap {
    let mut destinations = DestinationMap::new();
    for outbound in dataplane.networking.outbound.iter() {
        let Some(service) = outbound.service() else {
            continue;
        };
        let Some(route) = routes.get(&outbound.interface()) else {
            destinations
                .entry(service.to_string())
                .or_default()
                .add(Selector::service(service));
            continue;
        };

        for split in route.spec.conf.split.iter() {
            match split.destination.service_name() {
                Some(destination) => destinations
                    .entry(destination.to_string())
                    .or_default()
                    .add(split.destination.clone()),
                None => tracing::warn!(
                    route = %route.meta.name,
                    destination = %split.destination,
                    "Route destination has no service tag",
                ),
            }
        }
    }
    destinations
}

fn narrowed(route: &Resource<TrafficRoute>, tags: &TagSet) -> Resource<TrafficRoute> {
    let mut route = route.clone();
    for split in route.spec.conf.split.iter_mut() {
        split.destination = split.destination.narrowed_to(tags);
    }
    route
}
