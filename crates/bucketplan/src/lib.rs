//! ## Crate layout
//! - `core`: the bucket-to-node descriptor, node handles, placement,
//!   configuration, and observability.
//! - `error`: the stable public error type.
//!
//! The `prelude` module mirrors the surface a scheduler needs.

pub use bucketplan_core as core;

pub mod error;

pub use error::{BucketMapErrorKind, Error, ErrorKind, ErrorOrigin, PlacementErrorKind};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Error,
        core::{
            bucket::{BucketMapMode, BucketNodeMap, FixedMapping},
            config::{PlacementConfig, PlacementKind},
            node::{NodeHandle as _, NodeId},
            placement::{Placement, PlacementStrategy as _},
        },
    };
}
