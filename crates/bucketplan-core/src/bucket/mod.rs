//! Bucket-to-node assignment descriptor.
//!
//! A [`BucketNodeMap`] tells a scheduler how many buckets a partitioned data
//! set has and, when ownership is already known, which node owns each one.
//! Instances only come out of the validating factories; nothing mutates them
//! afterwards.

mod mapping;
mod record;

#[cfg(test)]
mod tests;

use crate::{
    error::ErrorClass,
    node::{NodeHandle, NodeId},
    obs::sink::{MetricsEvent, record},
    placement::{PlacementError, PlacementStrategy},
};
use derive_more::Display;
use std::num::NonZeroU32;
use thiserror::Error as ThisError;

pub use mapping::FixedMapping;

///
/// BucketMapError
///
/// Construction and accessor-contract failures for [`BucketNodeMap`].
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BucketMapError {
    #[error("bucket count must be positive: {bucket_count}")]
    NonPositiveBucketCount { bucket_count: i64 },

    #[error("bucket-to-node mapping is null")]
    MissingMapping,

    #[error("bucket number must be non-negative: {bucket}")]
    NegativeBucket { bucket: i32 },

    #[error("bucket-to-node mapping is empty")]
    EmptyMapping,

    #[error(
        "mismatched bucket count in bucket-to-node mapping ({entries}) and bucket count ({bucket_count})"
    )]
    MismatchedBucketCount { entries: usize, bucket_count: i64 },

    /// Caller asked a dynamic descriptor for its fixed mapping.
    #[error("no fixed bucket-to-node mapping present")]
    NoFixedMapping,
}

impl BucketMapError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NoFixedMapping => ErrorClass::IllegalState,
            _ => ErrorClass::InvalidArgument,
        }
    }

    /// Short stable label used by metrics counters.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NonPositiveBucketCount { .. } => "non_positive_bucket_count",
            Self::MissingMapping => "missing_mapping",
            Self::NegativeBucket { .. } => "negative_bucket",
            Self::EmptyMapping => "empty_mapping",
            Self::MismatchedBucketCount { .. } => "mismatched_bucket_count",
            Self::NoFixedMapping => "no_fixed_mapping",
        }
    }
}

///
/// BucketMapMode
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum BucketMapMode {
    /// Assignment is deferred to a placement strategy.
    #[display("dynamic")]
    Dynamic,

    /// Assignment was supplied at construction and is authoritative.
    #[display("fixed")]
    Fixed,
}

///
/// Assignment
///

#[derive(Clone, Debug, Eq, PartialEq)]
enum Assignment<N> {
    Dynamic,
    Fixed(FixedMapping<N>),
}

///
/// BucketNodeMap
///
/// Immutable bucket-to-node descriptor consumed by scheduling.
///
/// Callers read `bucket_count()`, branch on `has_fixed_mapping()`, and either
/// use `fixed_mapping()` or hand the count to their own placement
/// (`resolve` packages that branch).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BucketNodeMap<N = NodeId> {
    bucket_count: NonZeroU32,
    assignment: Assignment<N>,
}

impl<N> BucketNodeMap<N> {
    /// Build a descriptor whose bucket-to-node assignment is decided later.
    pub fn dynamic(bucket_count: i32) -> Result<Self, BucketMapError> {
        observe(Self::from_parts(i64::from(bucket_count), None))
    }

    /// Build a descriptor from an externally known bucket-to-node mapping.
    ///
    /// Keys must be exactly `0..bucket_count`; the bucket count is derived
    /// from the largest key. Nodes are cloned into storage owned by the
    /// descriptor, so the caller's map can change freely afterwards.
    pub fn fixed<'a, I>(bucket_to_node: I) -> Result<Self, BucketMapError>
    where
        I: IntoIterator<Item = (&'a i32, &'a N)>,
        N: Clone + 'a,
    {
        observe(Self::build_fixed(bucket_to_node, None))
    }

    /// Same as [`fixed`](Self::fixed) for callers holding an optional mapping.
    pub fn fixed_opt<'a, I>(bucket_to_node: Option<I>) -> Result<Self, BucketMapError>
    where
        I: IntoIterator<Item = (&'a i32, &'a N)>,
        N: Clone + 'a,
    {
        match bucket_to_node {
            Some(bucket_to_node) => Self::fixed(bucket_to_node),
            None => observe(Err(BucketMapError::MissingMapping)),
        }
    }

    /// Validate a mapping and finish through `from_parts`.
    ///
    /// `declared` is a bucket count supplied alongside the mapping (decoded
    /// records); when present it must agree with the mapping's entry count.
    fn build_fixed<'a, I>(
        bucket_to_node: I,
        declared: Option<i64>,
    ) -> Result<Self, BucketMapError>
    where
        I: IntoIterator<Item = (&'a i32, &'a N)>,
        N: Clone + 'a,
    {
        let mut entries = Vec::new();
        for (&bucket, node) in bucket_to_node {
            let bucket =
                u32::try_from(bucket).map_err(|_| BucketMapError::NegativeBucket { bucket })?;
            entries.push((bucket, node.clone()));
        }

        let max_bucket = entries
            .iter()
            .map(|(bucket, _)| *bucket)
            .max()
            .ok_or(BucketMapError::EmptyMapping)?;
        let bucket_count = i64::from(max_bucket) + 1;

        let entry_count = entries.len();
        if i64::try_from(entry_count).ok() != Some(bucket_count) {
            return Err(BucketMapError::MismatchedBucketCount {
                entries: entry_count,
                bucket_count,
            });
        }

        // Repeated keys from a non-map source leave a hole; report the
        // distinct key count against the derived bucket count.
        let mapping = FixedMapping::from_entries(entries).map_err(|distinct| {
            BucketMapError::MismatchedBucketCount {
                entries: distinct,
                bucket_count,
            }
        })?;

        Self::from_parts(declared.unwrap_or(bucket_count), Some(mapping))
    }

    /// Shared invariant check every construction path finishes through.
    fn from_parts(
        bucket_count: i64,
        mapping: Option<FixedMapping<N>>,
    ) -> Result<Self, BucketMapError> {
        let count = u32::try_from(bucket_count)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(BucketMapError::NonPositiveBucketCount { bucket_count })?;

        let assignment = match mapping {
            Some(mapping) => {
                if i64::try_from(mapping.len()).ok() != Some(bucket_count) {
                    return Err(BucketMapError::MismatchedBucketCount {
                        entries: mapping.len(),
                        bucket_count,
                    });
                }
                Assignment::Fixed(mapping)
            }
            None => Assignment::Dynamic,
        };

        Ok(Self {
            bucket_count: count,
            assignment,
        })
    }

    #[must_use]
    pub const fn bucket_count(&self) -> u32 {
        self.bucket_count.get()
    }

    #[must_use]
    pub const fn has_fixed_mapping(&self) -> bool {
        matches!(self.assignment, Assignment::Fixed(_))
    }

    #[must_use]
    pub const fn mode(&self) -> BucketMapMode {
        match self.assignment {
            Assignment::Dynamic => BucketMapMode::Dynamic,
            Assignment::Fixed(_) => BucketMapMode::Fixed,
        }
    }

    /// Return the fixed mapping.
    ///
    /// Calling this on a dynamic descriptor is a contract violation; check
    /// `has_fixed_mapping()` first.
    pub const fn fixed_mapping(&self) -> Result<&FixedMapping<N>, BucketMapError> {
        match &self.assignment {
            Assignment::Fixed(mapping) => Ok(mapping),
            Assignment::Dynamic => Err(BucketMapError::NoFixedMapping),
        }
    }

    #[must_use]
    pub const fn as_fixed(&self) -> Option<&FixedMapping<N>> {
        match &self.assignment {
            Assignment::Fixed(mapping) => Some(mapping),
            Assignment::Dynamic => None,
        }
    }
}

impl<N: NodeHandle> BucketNodeMap<N> {
    /// Produce a concrete assignment for scheduling.
    ///
    /// Fixed descriptors return their own mapping and ignore `strategy` and
    /// `nodes`. Dynamic descriptors ask `strategy` to place `bucket_count()`
    /// buckets over `nodes`.
    pub fn resolve<S>(
        &self,
        strategy: &S,
        nodes: &[N],
    ) -> Result<FixedMapping<N>, PlacementError>
    where
        S: PlacementStrategy<N> + ?Sized,
    {
        let mapping = match &self.assignment {
            Assignment::Fixed(mapping) => return Ok(mapping.clone()),
            Assignment::Dynamic => strategy.place(self.bucket_count, nodes),
        };

        let checked = mapping.and_then(|mapping| {
            if mapping.len() == self.bucket_count.get() as usize {
                Ok(mapping)
            } else {
                Err(PlacementError::WrongBucketCount {
                    strategy: strategy.name(),
                    expected: self.bucket_count.get(),
                    actual: mapping.len(),
                })
            }
        });

        match &checked {
            Ok(mapping) => record(MetricsEvent::Placement {
                strategy: strategy.name(),
                buckets: mapping.len() as u64,
            }),
            Err(_) => record(MetricsEvent::PlacementFailed {
                strategy: strategy.name(),
            }),
        }

        checked
    }
}

// Record the outcome of a factory call.
fn observe<N>(
    built: Result<BucketNodeMap<N>, BucketMapError>,
) -> Result<BucketNodeMap<N>, BucketMapError> {
    match &built {
        Ok(map) => record(MetricsEvent::MapBuilt { mode: map.mode() }),
        Err(err) => record(MetricsEvent::MapRejected {
            reason: err.reason(),
        }),
    }

    built
}
