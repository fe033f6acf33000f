use crate::policy::{by_name, outranks, Policy};
use mesh_policy_controller_api::{
    policy::DataplanePolicySpec, Dataplane, Resource, Selector, TagSelectorRank,
};

/// A policy that selects whole dataplanes.
pub trait DataplanePolicy: Policy {
    fn selectors(&self) -> &[Selector];
}

impl<S: DataplanePolicySpec> DataplanePolicy for Resource<S> {
    fn selectors(&self) -> &[Selector] {
        self.spec.selectors()
    }
}

/// Selects the single policy that applies to a dataplane, if any.
///
/// The policy with the most specific selector matching any of the
/// dataplane's tag sets wins; ties go to the most recently created policy.
pub fn select_dataplane_policy<'p, P: DataplanePolicy>(
    dataplane: &Dataplane,
    policies: &'p [P],
) -> Option<&'p P> {
    let mut best: Option<(&'p P, TagSelectorRank)> = None;
    for policy in by_name(policies) {
        let rank = dataplane
            .tag_sets()
            .flat_map(|tags| policy.selectors().iter().filter_map(move |s| s.rank_for(tags)))
            .max();
        if let Some(rank) = rank {
            if outranks(policy, rank, best) {
                best = Some((policy, rank));
            }
        }
    }
    best.map(|(policy, _)| policy)
}
