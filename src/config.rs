//! Aggregated creature tunables and their RON representation.

use crate::chain::ChainConfig;
use crate::error::ConfigError;
use crate::pose::{AimConfig, PoseConfig};
use crate::profile::ProfileConfig;
use crate::propulsion::PropulsionConfig;
use crate::rhythm::RhythmConfig;
use serde::{Deserialize, Serialize};

/// Every tunable of a creature. Missing sections fall back to their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    pub chain: ChainConfig,
    pub profile: ProfileConfig,
    pub aim: AimConfig,
    pub pose: PoseConfig,
    pub rhythm: RhythmConfig,
    pub propulsion: PropulsionConfig,
}

impl CreatureConfig {
    /// Parses a config from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}
