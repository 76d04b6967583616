//! Configuration file (TOML)
//!
//! Every field has a default, so an absent file or an empty table gives the
//! stock setup: indexed 320×240 raster, aspect-fit scaling, 2x intermediate
//! target with linear smoothing, in a 640×480 window.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;
use crate::core::{PipelineSettings, RasterMode, ScalingPolicy, RASTER_HEIGHT, RASTER_WIDTH};

/// Largest accepted intermediate magnification
pub const MAX_MAGNIFICATION: u32 = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

/// Pipeline options
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoConfig {
    #[serde(default)]
    pub mode: RasterMode,
    #[serde(default)]
    pub scaling: ScalingPolicy,
    /// Intermediate target scale (default: 2, range: 1-8)
    #[serde(default = "default_magnification")]
    pub magnification: u32,
    /// Linear filtering of the intermediate image under aspect-fit (default: true)
    #[serde(default = "default_true")]
    pub smooth: bool,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Letterbox color, linear RGB 0.0-1.0
    #[serde(default = "default_clear_color")]
    pub clear_color: [f64; 3],
}

/// Initial window setup
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub fullscreen: bool,
}

fn default_true() -> bool {
    true
}
fn default_magnification() -> u32 {
    2
}
fn default_clear_color() -> [f64; 3] {
    [0.05, 0.05, 0.05]
}
fn default_title() -> String {
    "Emu v0.1.0".to_string()
}
fn default_width() -> u32 {
    RASTER_WIDTH * 2
}
fn default_height() -> u32 {
    RASTER_HEIGHT * 2
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            mode: RasterMode::default(),
            scaling: ScalingPolicy::default(),
            magnification: default_magnification(),
            smooth: default_true(),
            vsync: default_true(),
            clear_color: default_clear_color(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            fullscreen: false,
        }
    }
}

impl Config {
    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// File named on the command line (or defaults), then CLI overrides
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load(path)?
            }
            None => Self::default(),
        };

        if let Some(mode) = cli.mode {
            config.video.mode = mode;
        }
        if let Some(scaling) = cli.scaling {
            config.video.scaling = scaling;
        }
        if let Some(magnification) = cli.magnification {
            config.video.magnification = magnification;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_MAGNIFICATION).contains(&self.video.magnification) {
            return Err(ConfigError::Invalid(format!(
                "magnification must be between 1 and {}, got {}",
                MAX_MAGNIFICATION, self.video.magnification
            )));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.video.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(
                "clear_color components must be within 0.0-1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Pipeline settings for the fixed default raster resolution
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            mode: self.video.mode,
            policy: self.video.scaling,
            raster_width: RASTER_WIDTH,
            raster_height: RASTER_HEIGHT,
            magnification: self.video.magnification,
            smooth: self.video.smooth,
            clear_color: self.video.clear_color,
        }
    }
}
