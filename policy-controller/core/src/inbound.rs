use crate::{
    connection::{best_source_rank, ConnectionPolicy},
    policy::{by_name, outranks},
};
use mesh_policy_controller_api::{Dataplane, InboundInterface, TagSelectorRank, TagSet};
use std::collections::BTreeMap;

/// Selects, for each inbound of a dataplane, the policy that applies to
/// connections arriving on it.
///
/// A policy applies to an inbound when one of its destinations matches the
/// inbound's tags, and is ranked by its best matching destination. Sources
/// aren't read: the connecting workload is only known once a connection
/// arrives.
pub fn select_inbound_connection_policies<'p, P: ConnectionPolicy>(
    dataplane: &Dataplane,
    policies: &'p [P],
) -> BTreeMap<InboundInterface, &'p P> {
    let mut selected = BTreeMap::new();
    if policies.is_empty() {
        return selected;
    }
    let sorted = by_name(policies);
    for inbound in dataplane.networking.inbound.iter() {
        if let Some(policy) = select_sorted(&inbound.tags, &sorted) {
            selected.insert(dataplane.inbound_interface(inbound), policy);
        }
    }
    selected
}

/// Selects the policy that applies to connections to a workload with the
/// given tags.
pub fn select_inbound_connection_policy<'p, P: ConnectionPolicy>(
    tags: &TagSet,
    policies: &'p [P],
) -> Option<&'p P> {
    select_sorted(tags, &by_name(policies))
}

fn select_sorted<'p, P: ConnectionPolicy>(tags: &TagSet, sorted: &[&'p P]) -> Option<&'p P> {
    let mut best: Option<(&'p P, TagSelectorRank)> = None;
    for policy in sorted.iter().copied() {
        let Some(rank) = best_source_rank(Some(tags), policy.destinations()) else {
            continue;
        };
        if outranks(policy, rank, best) {
            best = Some((policy, rank));
        }
    }
    best.map(|(policy, _)| policy)
}

