use crate::{bucket::BucketMapError, config::ConfigError, placement::PlacementError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub const fn is_illegal_state(&self) -> bool {
        matches!(self.class, ErrorClass::IllegalState)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<BucketMapError> for InternalError {
    fn from(err: BucketMapError) -> Self {
        Self {
            class: err.class(),
            origin: ErrorOrigin::BucketMap,
            message: err.to_string(),
            detail: Some(ErrorDetail::BucketMap(err)),
        }
    }
}

impl From<PlacementError> for InternalError {
    fn from(err: PlacementError) -> Self {
        Self {
            class: err.class(),
            origin: ErrorOrigin::Placement,
            message: err.to_string(),
            detail: Some(ErrorDetail::Placement(err)),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    BucketMap(BucketMapError),

    #[error("{0}")]
    Placement(PlacementError),
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Malformed or inconsistent input to a factory.
    InvalidArgument,

    /// A caller broke an accessor contract.
    IllegalState,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::IllegalState => "illegal_state",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    BucketMap,
    Placement,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BucketMap => "bucket_map",
            Self::Placement => "placement",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
