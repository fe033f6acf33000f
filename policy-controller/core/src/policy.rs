use chrono::{offset::Utc, DateTime};
use mesh_policy_controller_api::{Resource, TagSelectorRank};

/// A named policy.
pub trait Policy {
    fn name(&self) -> &str;

    /// Breaks ties between equally specific policies.
    fn creation_time(&self) -> DateTime<Utc>;
}

impl<S> Policy for Resource<S> {
    fn name(&self) -> &str {
        &self.meta.name
    }

    fn creation_time(&self) -> DateTime<Utc> {
        self.meta.creation_time
    }
}

/// Orders policies by name so that selection doesn't depend on the order in
/// which policies were listed.
pub(crate) fn by_name<P: Policy>(policies: &[P]) -> Vec<&P> {
    let mut sorted = policies.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    sorted
}

/// Returns true if a policy with the given rank replaces the current best.
/// Equal ranks are only replaced by strictly newer policies.
pub(crate) fn outranks<P: Policy>(
    policy: &P,
    rank: TagSelectorRank,
    best: Option<(&P, TagSelectorRank)>,
) -> bool {
    match best {
        None => true,
        Some((current, best_rank)) => {
            rank > best_rank
                || (rank == best_rank && policy.creation_time() > current.creation_time())
        }
    }
}
