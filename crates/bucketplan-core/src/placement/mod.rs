//! Placement: turning a dynamic descriptor into a concrete assignment.
//!
//! A dynamic [`BucketNodeMap`](crate::bucket::BucketNodeMap) only knows its
//! bucket count. Schedulers pick a [`PlacementStrategy`] and the live node
//! set, and `resolve` produces the mapping.

mod rendezvous;
mod round_robin;

use crate::{bucket::FixedMapping, error::ErrorClass, node::NodeHandle};
use std::num::NonZeroU32;
use thiserror::Error as ThisError;

pub use rendezvous::RendezvousPlacement;
pub use round_robin::RoundRobinPlacement;

///
/// PlacementError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlacementError {
    #[error("cannot place {bucket_count} buckets: no nodes available")]
    NoNodes { bucket_count: u32 },

    #[error("placement produced an empty assignment")]
    EmptyAssignment,

    #[error("placement '{strategy}' produced {actual} buckets, expected {expected}")]
    WrongBucketCount {
        strategy: &'static str,
        expected: u32,
        actual: usize,
    },
}

impl PlacementError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NoNodes { .. } => ErrorClass::InvalidArgument,
            Self::EmptyAssignment | Self::WrongBucketCount { .. } => ErrorClass::IllegalState,
        }
    }
}

///
/// PlacementStrategy
///
/// Assigns `bucket_count` buckets over `nodes`. Implementations must return
/// exactly one node per bucket; `resolve` rejects anything else.
///

pub trait PlacementStrategy<N: NodeHandle> {
    /// Stable strategy label for diagnostics and metrics.
    fn name(&self) -> &'static str;

    fn place(
        &self,
        bucket_count: NonZeroU32,
        nodes: &[N],
    ) -> Result<FixedMapping<N>, PlacementError>;
}

///
/// Placement
///
/// Stock strategies behind one type, as built from configuration.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placement {
    RoundRobin(RoundRobinPlacement),
    Rendezvous(RendezvousPlacement),
}

impl Default for Placement {
    fn default() -> Self {
        Self::RoundRobin(RoundRobinPlacement)
    }
}

impl<N: NodeHandle> PlacementStrategy<N> for Placement {
    fn name(&self) -> &'static str {
        match self {
            Self::RoundRobin(inner) => PlacementStrategy::<N>::name(inner),
            Self::Rendezvous(inner) => PlacementStrategy::<N>::name(inner),
        }
    }

    fn place(
        &self,
        bucket_count: NonZeroU32,
        nodes: &[N],
    ) -> Result<FixedMapping<N>, PlacementError> {
        match self {
            Self::RoundRobin(inner) => inner.place(bucket_count, nodes),
            Self::Rendezvous(inner) => inner.place(bucket_count, nodes),
        }
    }
}

// Deduplicate and order nodes so every scheduler sees the same node list.
fn canonical_nodes<N: NodeHandle>(
    bucket_count: NonZeroU32,
    nodes: &[N],
) -> Result<Vec<N>, PlacementError> {
    if nodes.is_empty() {
        return Err(PlacementError::NoNodes {
            bucket_count: bucket_count.get(),
        });
    }

    let mut nodes = nodes.to_vec();
    nodes.sort();
    nodes.dedup();

    Ok(nodes)
}
