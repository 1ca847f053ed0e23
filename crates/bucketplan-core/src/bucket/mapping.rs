use crate::placement::PlacementError;
use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

///
/// FixedMapping
///
/// Read-only bucket-to-node view. Buckets are dense and zero-based, so the
/// node for bucket `b` lives at index `b`. Storage is shared on clone and
/// never handed out mutably.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FixedMapping<N> {
    nodes: Arc<[N]>,
}

impl<N> FixedMapping<N> {
    /// Build a mapping from nodes already ordered by bucket number.
    ///
    /// This is the entry point for custom [`PlacementStrategy`] impls: entry
    /// `i` owns bucket `i`. An empty vector is rejected.
    ///
    /// [`PlacementStrategy`]: crate::placement::PlacementStrategy
    pub fn from_nodes(nodes: Vec<N>) -> Result<Self, PlacementError> {
        if nodes.is_empty() {
            return Err(PlacementError::EmptyAssignment);
        }

        Ok(Self::from_dense(nodes))
    }

    /// Wrap nodes already ordered by bucket number.
    pub(crate) fn from_dense(nodes: Vec<N>) -> Self {
        Self {
            nodes: nodes.into(),
        }
    }

    /// Slot `(bucket, node)` pairs into dense order.
    ///
    /// Callers guarantee every bucket is below `entries.len()`. Returns the
    /// number of distinct buckets seen when some slot stays empty.
    pub(crate) fn from_entries(entries: Vec<(u32, N)>) -> Result<Self, usize> {
        let mut slots: Vec<Option<N>> = std::iter::repeat_with(|| None)
            .take(entries.len())
            .collect();

        for (bucket, node) in entries {
            if let Some(slot) = usize::try_from(bucket).ok().and_then(|i| slots.get_mut(i)) {
                *slot = Some(node);
            }
        }

        let distinct = slots.iter().filter(|slot| slot.is_some()).count();
        let nodes: Option<Vec<N>> = slots.into_iter().collect();

        nodes.map(Self::from_dense).ok_or(distinct)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node owning `bucket`, if the bucket is in range.
    #[must_use]
    pub fn node(&self, bucket: u32) -> Option<&N> {
        usize::try_from(bucket)
            .ok()
            .and_then(|index| self.nodes.get(index))
    }

    /// Nodes in bucket order.
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &N)> + '_ {
        (0u32..).zip(self.nodes.iter())
    }

    /// Buckets owned by `node`, ascending.
    pub fn buckets_for<'a>(&'a self, node: &'a N) -> impl Iterator<Item = u32> + 'a
    where
        N: PartialEq,
    {
        self.iter()
            .filter(move |(_, owner)| *owner == node)
            .map(|(bucket, _)| bucket)
    }

    /// Every node that owns at least one bucket.
    #[must_use]
    pub fn distinct_nodes(&self) -> BTreeSet<&N>
    where
        N: Ord,
    {
        self.nodes.iter().collect()
    }

    /// Copy the view out as an ordinary map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<u32, N>
    where
        N: Clone,
    {
        self.iter().map(|(bucket, node)| (bucket, node.clone())).collect()
    }
}

impl<N: Serialize> Serialize for FixedMapping<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}
