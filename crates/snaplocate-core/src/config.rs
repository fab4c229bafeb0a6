//! Scanner configuration.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields a working scanner:
//!
//! ```toml
//! cooldown_ms = 500
//! highlight_ms = 1000
//! pause_on_match = true
//! channel_capacity = 100
//! export_path = "ScannedBarcodes.csv"
//!
//! [decoder]
//! kind = "replay"
//! script = "frames.tsv"
//! ```

use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_COOLDOWN_MS, DEFAULT_EXPORT_FILE_NAME, DEFAULT_HIGHLIGHT_MS,
    MAX_HIGHLIGHT_MS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which decoder implementation feeds the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecoderKind {
    /// Programmatically driven decoder, for development and tests.
    #[default]
    Mock,

    /// Replays decode events from a tab-separated script file.
    Replay {
        /// Path to the script.
        script: PathBuf,
    },
}

/// Runtime configuration for a scan session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Minimum time between two accepted decode events, in milliseconds.
    pub cooldown_ms: u64,

    /// How long a match highlight stays up, in milliseconds.
    pub highlight_ms: u64,

    /// Pause the decoder feed while a match highlight is shown.
    pub pause_on_match: bool,

    /// Capacity of the bounded channels between session tasks.
    pub channel_capacity: usize,

    /// Decoder selection.
    pub decoder: DecoderKind,

    /// Destination of the CSV export.
    pub export_path: PathBuf,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
            pause_on_match: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            decoder: DecoderKind::default(),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE_NAME),
        }
    }
}

impl ScannerConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema or a
    /// value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_core::ScannerConfig;
    ///
    /// let config = ScannerConfig::from_toml_str("cooldown_ms = 250").unwrap();
    /// assert_eq!(config.cooldown_ms, 250);
    /// assert_eq!(config.highlight_ms, 1000);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ScannerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, and a parse or
    /// validation error otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.highlight_ms == 0 || self.highlight_ms > MAX_HIGHLIGHT_MS {
            return Err(Error::invalid_config(
                "highlight_ms",
                format!("must be 1-{MAX_HIGHLIGHT_MS}, got {}", self.highlight_ms),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(Error::invalid_config(
                "channel_capacity",
                "must be greater than zero",
            ));
        }

        if let DecoderKind::Replay { script } = &self.decoder
            && script.as_os_str().is_empty()
        {
            return Err(Error::invalid_config("decoder.script", "must not be empty"));
        }

        Ok(())
    }

    /// Cooldown period as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Highlight lifetime as a [`Duration`].
    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}
