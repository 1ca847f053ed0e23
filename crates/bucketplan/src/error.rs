use bucketplan_core::{
    bucket::BucketMapError,
    config::ConfigError,
    error::{ErrorDetail, ErrorOrigin as CoreErrorOrigin, InternalError},
    placement::PlacementError,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// True for accessor-contract violations rather than bad input.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::BucketMap(BucketMapErrorKind::NoFixedMapping)
                | ErrorKind::Placement(
                    PlacementErrorKind::EmptyAssignment | PlacementErrorKind::WrongBucketCount
                )
        )
    }
}

impl From<BucketMapError> for Error {
    fn from(err: BucketMapError) -> Self {
        let kind = match err {
            BucketMapError::NonPositiveBucketCount { .. } => BucketMapErrorKind::NonPositiveCount,
            BucketMapError::MissingMapping => BucketMapErrorKind::MissingMapping,
            BucketMapError::NegativeBucket { .. } => BucketMapErrorKind::NegativeBucket,
            BucketMapError::EmptyMapping => BucketMapErrorKind::EmptyMapping,
            BucketMapError::MismatchedBucketCount { .. } => BucketMapErrorKind::MismatchedCount,
            BucketMapError::NoFixedMapping => BucketMapErrorKind::NoFixedMapping,
        };

        Self::new(ErrorKind::BucketMap(kind), ErrorOrigin::BucketMap, err.to_string())
    }
}

impl From<PlacementError> for Error {
    fn from(err: PlacementError) -> Self {
        let kind = match err {
            PlacementError::NoNodes { .. } => PlacementErrorKind::NoNodes,
            PlacementError::EmptyAssignment => PlacementErrorKind::EmptyAssignment,
            PlacementError::WrongBucketCount { .. } => PlacementErrorKind::WrongBucketCount,
        };

        Self::new(ErrorKind::Placement(kind), ErrorOrigin::Placement, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        match err.detail {
            Some(ErrorDetail::BucketMap(inner)) => inner.into(),
            Some(ErrorDetail::Placement(inner)) => inner.into(),
            None => Self::new(ErrorKind::Internal, err.origin.into(), err.message),
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    BucketMap(BucketMapErrorKind),
    Placement(PlacementErrorKind),

    /// Placement configuration is inconsistent.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// BucketMapErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BucketMapErrorKind {
    NonPositiveCount,
    MissingMapping,
    NegativeBucket,
    EmptyMapping,

    /// Mapping keys are sparse, repeated, or disagree with the bucket count.
    MismatchedCount,

    /// `fixed_mapping()` was called on a dynamic descriptor.
    NoFixedMapping,
}

///
/// PlacementErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlacementErrorKind {
    NoNodes,

    /// A strategy handed back a mapping with no buckets.
    EmptyAssignment,

    WrongBucketCount,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    #[display("bucket_map")]
    BucketMap,

    #[display("placement")]
    Placement,

    #[display("config")]
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::BucketMap => Self::BucketMap,
            CoreErrorOrigin::Placement => Self::Placement,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}
