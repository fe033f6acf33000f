use crate::{
    outbound::{DestinationMap, ServiceName, TagSelectorSet},
    policy::{by_name, outranks, Policy},
};
use mesh_policy_controller_api::{
    policy::ConnectionPolicySpec, Dataplane, Resource, Selector, TagSelectorRank, TagSet,
};
use std::collections::BTreeMap;

/// A policy that selects connections by their source and destination.
pub trait ConnectionPolicy: Policy {
    fn sources(&self) -> &[Selector];

    fn destinations(&self) -> &[Selector];
}

impl<S: ConnectionPolicySpec> ConnectionPolicy for Resource<S> {
    fn sources(&self) -> &[Selector] {
        self.spec.sources()
    }

    fn destinations(&self) -> &[Selector] {
        self.spec.destinations()
    }
}

/// Selects, for each destination service, the connection policy that applies
/// to traffic from `dataplane` to that service.
///
/// A policy applies when one of its sources matches one of the dataplane's
/// tag sets and one of its destinations matches one of the service's
/// selectors. The most specific policy wins; ties go to the most recently
/// created policy and then to the policy whose name sorts first.
pub fn select_connection_policies<'p, P: ConnectionPolicy>(
    dataplane: &Dataplane,
    destinations: &DestinationMap,
    policies: &'p [P],
) -> BTreeMap<ServiceName, &'p P> {
    let mut selected = BTreeMap::new();
    if destinations.is_empty() || policies.is_empty() {
        return selected;
    }

    let candidates = by_name(policies)
        .into_iter()
        .filter_map(|policy| {
            let rank = best_source_rank(dataplane.tag_sets(), policy.sources())?;
            Some((policy, rank))
        })
        .collect::<Vec<_>>();

    for (service, selectors) in destinations.iter() {
        let mut best: Option<(&'p P, TagSelectorRank)> = None;
        for (policy, source_rank) in candidates.iter() {
            let Some(destination_rank) = best_destination_rank(policy.destinations(), selectors)
            else {
                continue;
            };
            let rank = source_rank.combined_with(destination_rank);
            if outranks(*policy, rank, best) {
                best = Some((*policy, rank));
            }
        }
        if let Some((policy, _)) = best {
            selected.insert(service.clone(), policy);
        }
    }

    selected
}

pub(crate) fn best_source_rank<'t>(
    tag_sets: impl IntoIterator<Item = &'t TagSet>,
    sources: &[Selector],
) -> Option<TagSelectorRank> {
    tag_sets
        .into_iter()
        .flat_map(move |tags| sources.iter().filter_map(move |s| s.rank_for(tags)))
        .max()
}

fn best_destination_rank(
    destinations: &[Selector],
    candidates: &TagSelectorSet,
) -> Option<TagSelectorRank> {
    destinations
        .iter()
        .filter(|d| candidates.iter().any(|c| d.matches_selector(c)))
        .map(Selector::rank)
        .max()
}
