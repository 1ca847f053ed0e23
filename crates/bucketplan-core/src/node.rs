use derive_more::{Deref, Display, FromStr};
use serde::{Deserialize, Serialize, Serializer, de::Deserializer};
use std::{borrow::Cow, fmt::Debug};
use thiserror::Error as ThisError;
use ulid::Ulid as WrappedUlid;

///
/// NodeHandle
///
/// Opaque identity of a worker node as seen by the descriptor and placement.
/// The descriptor only stores and returns handles; placement additionally
/// orders them and hashes their `placement_key`.
///

pub trait NodeHandle: Clone + Debug + Eq + Ord {
    /// Stable bytes identifying this node across the cluster.
    fn placement_key(&self) -> Cow<'_, [u8]>;
}

impl NodeHandle for NodeId {
    fn placement_key(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.to_bytes().to_vec())
    }
}

impl NodeHandle for String {
    fn placement_key(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

///
/// NodeIdError
///

#[derive(Debug, ThisError)]
pub enum NodeIdError {
    #[error("invalid node id string: '{0}'")]
    InvalidString(String),
}

///
/// NodeId
///
/// ULID-backed node identifier handed out by the membership service.
///

#[derive(
    Clone, Copy, Debug, Deref, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd,
)]
#[repr(transparent)]
pub struct NodeId(WrappedUlid);

impl NodeId {
    #[must_use]
    pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self(WrappedUlid::from_parts(timestamp_ms, random))
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(WrappedUlid::from_bytes(bytes))
    }

    /// from_u128
    #[must_use]
    pub const fn from_u128(n: u128) -> Self {
        Self::from_bytes(n.to_be_bytes())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// try_from_str
    /// Parse the canonical 26-character ULID form.
    pub fn try_from_str(encoded: &str) -> Result<Self, NodeIdError> {
        let inner = WrappedUlid::from_string(encoded)
            .map_err(|_| NodeIdError::InvalidString(encoded.to_string()))?;

        Ok(Self(inner))
    }
}

impl From<WrappedUlid> for NodeId {
    fn from(inner: WrappedUlid) -> Self {
        Self(inner)
    }
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;

        Self::try_from_str(&encoded).map_err(serde::de::Error::custom)
    }
}
