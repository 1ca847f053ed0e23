use crate::{
    bucket::FixedMapping,
    node::NodeHandle,
    placement::{PlacementError, PlacementStrategy, canonical_nodes},
};
use std::num::NonZeroU32;

///
/// RoundRobinPlacement
///
/// Bucket `b` goes to the `b % n`-th node of the ordered node set. Spreads
/// buckets as evenly as possible but reshuffles most of them when the node
/// set changes.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RoundRobinPlacement;

impl<N: NodeHandle> PlacementStrategy<N> for RoundRobinPlacement {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn place(
        &self,
        bucket_count: NonZeroU32,
        nodes: &[N],
    ) -> Result<FixedMapping<N>, PlacementError> {
        let nodes = canonical_nodes(bucket_count, nodes)?;

        let assigned = nodes
            .iter()
            .cycle()
            .take(bucket_count.get() as usize)
            .cloned()
            .collect();

        Ok(FixedMapping::from_dense(assigned))
    }
}
