//! Enhancement configuration via TOML files.
//!
//! Configuration is parsed from TOML with per-field defaults and validated
//! before the public config types are constructed, so a loaded
//! [`EnhancementConfig`] always holds usable parameters.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::enhance::Strategy;

/// Enhancement configuration loaded from a TOML file.
///
/// # Examples
///
/// ```
/// use lowlight_enhance_core::EnhancementConfig;
///
/// let config = EnhancementConfig::load_from_file("config/enhance.toml")
///     .unwrap_or_else(|_| EnhancementConfig::default());
///
/// println!(
///     "strategy={} clip_limit={}",
///     config.strategy, config.classical.clip_limit
/// );
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementConfig {
    /// Which strategy [`crate::enhance::enhance`] dispatches to.
    pub strategy: Strategy,
    /// Parameters for the classical (CLAHE) strategy.
    pub classical: ClassicalConfig,
    /// Parameters for the learned strategy.
    pub learned: LearnedConfig,
}

impl EnhancementConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawRoot =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;

        let strategy = raw
            .enhance
            .strategy
            .parse::<Strategy>()
            .map_err(ConfigError::Parse)?;
        let classical = ClassicalConfig::try_from(&raw.enhance.classical)?;
        let learned = LearnedConfig::try_from(&raw.enhance.learned)?;

        Ok(Self {
            strategy,
            classical,
            learned,
        })
    }
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Classical,
            classical: ClassicalConfig::default(),
            learned: LearnedConfig::default(),
        }
    }
}

/// Classical strategy parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ClassicalConfig {
    /// Clip limit as a multiplier on the uniform histogram bin count.
    pub clip_limit: f32,
    /// Number of contextual regions along (rows, columns).
    pub tile_grid: (usize, usize),
}

impl ClassicalConfig {
    fn try_from(raw: &RawClassical) -> Result<Self, ConfigError> {
        if !raw.clip_limit.is_finite() || raw.clip_limit <= 0.0 {
            return Err(ConfigError::Parse(
                "enhance.classical.clip_limit must be positive".into(),
            ));
        }
        if raw.tile_grid[0] == 0 || raw.tile_grid[1] == 0 {
            return Err(ConfigError::Parse(
                "enhance.classical.tile_grid dimensions must be >= 1".into(),
            ));
        }

        Ok(Self {
            clip_limit: raw.clip_limit,
            tile_grid: (raw.tile_grid[0], raw.tile_grid[1]),
        })
    }
}

impl Default for ClassicalConfig {
    fn default() -> Self {
        Self {
            clip_limit: default_clip_limit(),
            tile_grid: (8, 8),
        }
    }
}

/// Learned strategy parameters. `model_path` is an opaque description of
/// where the caller's model artifact lives; the core never loads it.
#[derive(Debug, Clone, Serialize)]
pub struct LearnedConfig {
    pub model_path: PathBuf,
    /// Fixed (rows, columns) resolution the network expects.
    pub input_resolution: (usize, usize),
}

impl LearnedConfig {
    fn try_from(raw: &RawLearned) -> Result<Self, ConfigError> {
        if raw.input_resolution[0] == 0 || raw.input_resolution[1] == 0 {
            return Err(ConfigError::Parse(
                "enhance.learned.input_resolution dimensions must be >= 1".into(),
            ));
        }

        Ok(Self {
            model_path: PathBuf::from(&raw.model_path),
            input_resolution: (raw.input_resolution[0], raw.input_resolution[1]),
        })
    }
}

impl Default for LearnedConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(default_model_path()),
            input_resolution: (256, 256),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRoot {
    #[serde(default)]
    enhance: RawEnhance,
}

#[derive(Debug, Deserialize)]
struct RawEnhance {
    #[serde(default = "default_strategy")]
    strategy: String,
    #[serde(default)]
    classical: RawClassical,
    #[serde(default)]
    learned: RawLearned,
}

impl Default for RawEnhance {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            classical: RawClassical::default(),
            learned: RawLearned::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClassical {
    #[serde(default = "default_clip_limit")]
    clip_limit: f32,
    #[serde(default = "default_tile_grid")]
    tile_grid: [usize; 2],
}

impl Default for RawClassical {
    fn default() -> Self {
        Self {
            clip_limit: default_clip_limit(),
            tile_grid: default_tile_grid(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawLearned {
    #[serde(default = "default_model_path")]
    model_path: String,
    #[serde(default = "default_input_resolution")]
    input_resolution: [usize; 2],
}

impl Default for RawLearned {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            input_resolution: default_input_resolution(),
        }
    }
}

fn default_strategy() -> String {
    "classical".to_string()
}

fn default_clip_limit() -> f32 {
    3.0
}

fn default_tile_grid() -> [usize; 2] {
    [8, 8]
}

fn default_model_path() -> String {
    "models/lowlight_net.tflite".to_string()
}

fn default_input_resolution() -> [usize; 2] {
    [256, 256]
}

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {}", err),
            ConfigError::Parse(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_document_is_empty() {
        let config = EnhancementConfig::from_str("").unwrap();
        assert_eq!(config.strategy, Strategy::Classical);
        assert_eq!(config.classical.clip_limit, 3.0);
        assert_eq!(config.classical.tile_grid, (8, 8));
        assert_eq!(config.learned.input_resolution, (256, 256));
    }

    #[test]
    fn defaults_when_sections_missing() {
        let config = EnhancementConfig::from_str("[enhance]\nstrategy = \"learned\"").unwrap();
        assert_eq!(config.strategy, Strategy::Learned);
        assert_eq!(config.classical.tile_grid, (8, 8));
    }

    #[test]
    fn parses_full_document() {
        let toml = r#"
[enhance]
strategy = "learned"

[enhance.classical]
clip_limit = 2.0
tile_grid = [4, 6]

[enhance.learned]
model_path = "artifacts/net.bin"
input_resolution = [224, 224]
"#;
        let config = EnhancementConfig::from_str(toml).unwrap();
        assert_eq!(config.strategy, Strategy::Learned);
        assert!((config.classical.clip_limit - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.classical.tile_grid, (4, 6));
        assert_eq!(config.learned.model_path, PathBuf::from("artifacts/net.bin"));
        assert_eq!(config.learned.input_resolution, (224, 224));
    }

    #[test]
    fn rejects_zero_clip_limit() {
        let result = EnhancementConfig::from_str("[enhance.classical]\nclip_limit = 0.0");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_grid_dimension() {
        let result = EnhancementConfig::from_str("[enhance.classical]\ntile_grid = [0, 8]");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_input_resolution() {
        let result = EnhancementConfig::from_str("[enhance.learned]\ninput_resolution = [0, 256]");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        let result = EnhancementConfig::from_str("[enhance]\nstrategy = \"neural\"");
        assert!(result.is_err());
    }
}
