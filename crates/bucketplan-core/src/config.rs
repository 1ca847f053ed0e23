//! Placement configuration.
//!
//! Deployments describe which stock placement to use for dynamic
//! descriptors, usually as a TOML table; `build` turns the description into
//! a [`Placement`].

use crate::{
    DEFAULT_PLACEMENT_SEED,
    placement::{Placement, RendezvousPlacement, RoundRobinPlacement},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid placement config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("placement seed {seed} has no effect on round-robin placement")]
    UnusedSeed { seed: u64 },
}

///
/// PlacementKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    #[default]
    RoundRobin,
    Rendezvous,
}

///
/// PlacementConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementConfig {
    pub strategy: PlacementKind,
    pub seed: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            strategy: PlacementKind::default(),
            seed: DEFAULT_PLACEMENT_SEED,
        }
    }
}

impl PlacementConfig {
    /// Parse and validate a TOML placement table.
    ///
    /// An empty document yields the default (round-robin) config.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that would be silently ignored.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        match self.strategy {
            PlacementKind::RoundRobin if self.seed != DEFAULT_PLACEMENT_SEED => {
                Err(ConfigError::UnusedSeed { seed: self.seed })
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Result<Placement, ConfigError> {
        self.validate()?;

        let placement = match self.strategy {
            PlacementKind::RoundRobin => Placement::RoundRobin(RoundRobinPlacement),
            PlacementKind::Rendezvous => {
                Placement::Rendezvous(RendezvousPlacement::new(self.seed))
            }
        };

        Ok(placement)
    }
}
