//! Core runtime for bucketplan: the bucket-to-node descriptor, node handles,
//! placement strategies, configuration, and the observability boundary.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod bucket;
pub mod config;
pub mod error;
pub mod node;
pub mod obs;
pub mod placement;

///
/// CONSTANTS
///

/// Largest bucket number a fixed mapping can carry.
///
/// Bucket keys arrive as `i32`, so the derived bucket count never exceeds
/// `MAX_BUCKET_NUMBER + 1` and always fits a `u32`.
pub const MAX_BUCKET_NUMBER: i32 = i32::MAX;

/// Seed used by hashed placement when configuration does not supply one.
pub const DEFAULT_PLACEMENT_SEED: u64 = 0;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        bucket::{BucketMapMode, BucketNodeMap, FixedMapping},
        node::{NodeHandle, NodeId},
        placement::{Placement, PlacementStrategy},
    };
}
