//! Rendezvous (highest random weight) placement.
//!
//! Each bucket goes to the node with the highest `xxh3(bucket, node)` score.
//! Adding or removing a node only moves the buckets that node wins or held.

use crate::{
    DEFAULT_PLACEMENT_SEED,
    bucket::FixedMapping,
    node::NodeHandle,
    placement::{PlacementError, PlacementStrategy, canonical_nodes},
};
use std::num::NonZeroU32;
use xxhash_rust::xxh3::xxh3_64_with_seed;

///
/// RendezvousPlacement
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RendezvousPlacement {
    seed: u64,
}

impl RendezvousPlacement {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Score for a (bucket, node) pair; higher wins ownership.
    fn score<N: NodeHandle>(&self, bucket: u32, node: &N, buf: &mut Vec<u8>) -> u64 {
        buf.clear();
        buf.extend_from_slice(&bucket.to_le_bytes());
        buf.extend_from_slice(&node.placement_key());

        xxh3_64_with_seed(buf, self.seed)
    }
}

impl Default for RendezvousPlacement {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEMENT_SEED)
    }
}

impl<N: NodeHandle> PlacementStrategy<N> for RendezvousPlacement {
    fn name(&self) -> &'static str {
        "rendezvous"
    }

    fn place(
        &self,
        bucket_count: NonZeroU32,
        nodes: &[N],
    ) -> Result<FixedMapping<N>, PlacementError> {
        let nodes = canonical_nodes(bucket_count, nodes)?;
        let mut buf = Vec::new();
        let mut assigned = Vec::with_capacity(bucket_count.get() as usize);

        for bucket in 0..bucket_count.get() {
            let winner = nodes
                .iter()
                .max_by_key(|node| self.score(bucket, *node, &mut buf))
                .ok_or(PlacementError::NoNodes {
                    bucket_count: bucket_count.get(),
                })?;
            assigned.push(winner.clone());
        }

        Ok(FixedMapping::from_dense(assigned))
    }
}
