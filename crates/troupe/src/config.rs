//! Placer configuration, loaded from JSON.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```json
//! {
//!   "fixed_timestep_secs": 0.02,
//!   "rise_height": 15.0,
//!   "bindings": { "small": "KeyA", "medium": "KeyS", "large": "KeyD", "place": "Left" },
//!   "prefabs": "groups.json"
//! }
//! ```
//!
//! A relative `prefabs` path in a loaded file is taken relative to the
//! config file's directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::Camera2d;
use crate::character::DEFAULT_RISE_HEIGHT;
use crate::placer::PlacerBindings;
use crate::prefab::PrefabError;
use crate::time::DEFAULT_FIXED_STEP_SECS;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
    /// The prefab file named by the config failed to load.
    Prefabs(PrefabError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {msg}"),
            ConfigError::Prefabs(e) => write!(f, "Config prefabs: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Prefabs(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<PrefabError> for ConfigError {
    fn from(e: PrefabError) -> Self {
        ConfigError::Prefabs(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    pub fixed_timestep_secs: f32,
    /// World Y at which rising leafs are destroyed.
    pub rise_height: f32,
    pub bindings: PlacerBindings,
    pub camera: Camera2d,
    /// Prefab registry file. `None` uses the built-in groups.
    pub prefabs: Option<PathBuf>,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_secs: DEFAULT_FIXED_STEP_SECS,
            rise_height: DEFAULT_RISE_HEIGHT,
            bindings: PlacerBindings::default(),
            camera: Camera2d::default(),
            prefabs: None,
        }
    }
}

impl PlacerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            config.prefabs = config.prefabs.take().map(|prefabs| {
                if prefabs.is_relative() {
                    dir.join(prefabs)
                } else {
                    prefabs
                }
            });
        }
        log::info!("Loaded placer config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_timestep_secs.is_finite() && self.fixed_timestep_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fixed_timestep_secs must be positive, got {}",
                self.fixed_timestep_secs
            )));
        }
        if !self.rise_height.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "rise_height must be finite, got {}",
                self.rise_height
            )));
        }
        if self.camera.pixels_per_unit.is_nan() || self.camera.pixels_per_unit <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "camera.pixels_per_unit must be positive, got {}",
                self.camera.pixels_per_unit
            )));
        }
        Ok(())
    }
}
