//! Seam configuration file handling

use anyhow::{Context, Result};
use seam_scroll::headless::SurfaceConfig;
use seam_scroll::ScrollConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "seam.toml";

/// Top-level Seam configuration (seam.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SeamConfig {
    /// Coordinator and content scroller tuning
    #[serde(default)]
    pub scroll: ScrollConfig,
    /// Surface geometry, replacing the script's own when present
    #[serde(default)]
    pub surface: Option<SurfaceConfig>,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Playback settings
#[derive(Debug, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Frames run after the script ends
    #[serde(default)]
    pub extra_frames: u32,
    /// Print every n-th animation frame in text output (inputs are always
    /// printed)
    #[serde(default = "default_every")]
    pub every: u32,
}

fn default_every() -> u32 {
    1
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            extra_frames: 0,
            every: default_every(),
        }
    }
}

impl SeamConfig {
    /// Load configuration from a file or a directory (looks for seam.toml)
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found at {}. Run `seam config init` to create one.",
                CONFIG_FILE,
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    }

    /// Parse and validate TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SeamConfig = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scroll.validate().context("Invalid [scroll] section")?;
        if let Some(surface) = &self.surface {
            if surface.viewport_height <= 0 {
                anyhow::bail!(
                    "Invalid [surface] section: viewport_height must be > 0, got {}",
                    surface.viewport_height
                );
            }
            if surface.row_height <= 0 {
                anyhow::bail!(
                    "Invalid [surface] section: row_height must be > 0, got {}",
                    surface.row_height
                );
            }
        }
        Ok(())
    }

    /// Configuration written by `seam config init`
    pub fn starter() -> Self {
        Self {
            scroll: ScrollConfig::default(),
            surface: Some(SurfaceConfig::default()),
            playback: PlaybackConfig::default(),
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Write the starter configuration into `path`
    pub fn init(path: &Path, force: bool) -> Result<std::path::PathBuf> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };
        if config_path.exists() && !force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite it.",
                config_path.display()
            );
        }
        fs::write(&config_path, Self::starter().to_toml()?)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }
}
