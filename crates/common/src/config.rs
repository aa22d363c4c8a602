//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ScrublineError, ScrublineResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrublineConfig {
    /// Directory where extracted thumbnails are written.
    pub cache_dir: PathBuf,

    /// Filmstrip layout constants.
    #[serde(default)]
    pub layout: LayoutConstants,

    /// Frame extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fixed filmstrip geometry, shared by the mapper and the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConstants {
    /// Width of one thumbnail tile (px).
    pub tile_width: f64,

    /// Height of one thumbnail tile (px).
    pub tile_height: f64,

    /// Thumbnails per second of video.
    pub frames_per_second: f64,

    /// Duration covered by the selection window (seconds).
    pub window_duration_secs: f64,

    /// Position of the pop line as a fraction of the window width.
    pub window_anchor_fraction: f64,
}

/// Bulk frame extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Transcoder binary used for extraction.
    pub ffmpeg_binary: String,

    /// Probe binary used to read durations when no player is attached.
    pub ffprobe_binary: String,

    /// Width of extracted thumbnails (px). Twice the tile width for 2x displays.
    pub thumbnail_width: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "scrubline_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ScrublineConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            layout: LayoutConstants::default(),
            extraction: ExtractionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            tile_width: 40.0,
            tile_height: 80.0,
            frames_per_second: 1.0,
            window_duration_secs: 4.0,
            window_anchor_fraction: 0.5,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            ffprobe_binary: "ffprobe".to_string(),
            thumbnail_width: 80,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl LayoutConstants {
    /// Check that the mapper can divide by the tile geometry.
    ///
    /// A non-positive window duration is accepted with a warning; the
    /// playback loop skips wrapping for a degenerate window.
    pub fn validate(&self) -> ScrublineResult<()> {
        let fields = [
            ("tile_width", self.tile_width),
            ("tile_height", self.tile_height),
            ("frames_per_second", self.frames_per_second),
            ("window_duration_secs", self.window_duration_secs),
            ("window_anchor_fraction", self.window_anchor_fraction),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScrublineError::config(format!("{name} must be finite")));
        }
        if self.tile_width <= 0.0 {
            return Err(ScrublineError::config("tile_width must be positive"));
        }
        if self.frames_per_second <= 0.0 {
            return Err(ScrublineError::config("frames_per_second must be positive"));
        }
        if !(0.0..=1.0).contains(&self.window_anchor_fraction) {
            return Err(ScrublineError::config(
                "window_anchor_fraction must lie within [0, 1]",
            ));
        }
        if self.window_duration_secs <= 0.0 {
            tracing::warn!(
                window_duration_secs = self.window_duration_secs,
                "Selection window is degenerate; playback will not loop"
            );
        }
        Ok(())
    }
}

impl ScrublineConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> ScrublineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ScrublineResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> ScrublineResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("scrubline").join("config.json")
}

/// Default thumbnail cache directory.
fn default_cache_dir() -> PathBuf {
    let base = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".cache")
        });
    base.join("scrubline").join("frames")
}
