use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PredioError, Result};

/// Top-level configuration for the Predio application.
///
/// Loaded from `~/.predio/config.toml` by default, one section per
/// subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl Default for PredioConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            search: SearchConfig::default(),
            memory: MemoryConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl PredioConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PredioConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PredioError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Path to the property inventory JSON file.
    pub inventory_file: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            inventory_file: "~/.predio/properties.json".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Search and ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Embedding dimension expected from the provider.
    pub embedding_dim: usize,
    /// Number of results when the caller does not pass a limit.
    pub default_limit: usize,
    /// Upper bound on caller-supplied limits.
    pub max_limit: usize,
    /// Constant added when a property's location matches a requested one.
    pub location_boost: f64,
    /// Constant subtracted when a property was already shown to the user.
    pub shown_penalty: f64,
    /// Deadline for one embedding call, in seconds.
    pub embed_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            default_limit: 5,
            max_limit: 50,
            location_boost: 0.5,
            shown_penalty: 0.2,
            embed_timeout_secs: 5,
        }
    }
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Turns recorded since the last summary before summarization runs.
    pub summary_interval: usize,
    /// Most recent turns kept verbatim when the window collapses.
    pub summary_tail: usize,
    /// Maximum shown-property ids retained per user (oldest evicted).
    pub max_shown: usize,
    /// Deadline for one summarization call, in seconds.
    pub complete_timeout_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            summary_interval: 10,
            summary_tail: 4,
            max_shown: 50,
            complete_timeout_secs: 10,
        }
    }
}

/// How a bare price numeral without an explicit multiplier is read.
///
/// "450 millones" is unambiguous; a plain "450" next to a currency cue is
/// not. COP listings are conventionally quoted in millions, so the default
/// policy scales small literals; `Literal` turns the guessing off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnitPolicy {
    /// Multiply bare literals below `literal_threshold` by one million.
    AssumeMillions,
    /// Take every numeral at face value.
    Literal,
}

/// Filter extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Unit-inference policy for bare price numerals.
    pub price_unit_policy: PriceUnitPolicy,
    /// Bare literals at or above this value are never scaled.
    pub literal_threshold: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            price_unit_policy: PriceUnitPolicy::AssumeMillions,
            literal_threshold: 10_000,
        }
    }
}
