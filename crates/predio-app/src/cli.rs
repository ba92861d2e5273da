//! CLI argument definitions for the Predio application.
//!
//! `clap` derive surface plus the resolution helpers that settle each
//! setting by priority: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Predio — conversational property search with per-user memory.
#[derive(Parser, Debug)]
#[command(name = "predio", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Path to the property inventory JSON file.
    #[arg(short = 'd', long = "data")]
    pub data: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one query and print the ranked listings.
    Search {
        /// Query text, in Spanish.
        query: String,
        /// User id owning the conversational state.
        #[arg(short = 'u', long = "user", default_value = "local")]
        user: String,
        /// Maximum number of results.
        #[arg(short = 'n', long = "limit")]
        limit: Option<usize>,
        /// Print the full outcome as JSON.
        #[arg(long = "json")]
        json: bool,
    },
    /// Interactive search conversation.
    Repl {
        /// User id owning the conversational state.
        #[arg(short = 'u', long = "user", default_value = "local")]
        user: String,
    },
    /// Print one listing by id.
    Show {
        /// Listing id.
        id: String,
    },
    /// Print a user's memory snapshot as JSON.
    Snapshot {
        /// User id to export.
        #[arg(short = 'u', long = "user", default_value = "local")]
        user: String,
    },
    /// Clear a user's conversational state.
    Reset {
        /// User id to clear.
        #[arg(short = 'u', long = "user", default_value = "local")]
        user: String,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PREDIO_CONFIG env var > ~/.predio/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PREDIO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the inventory file path.
    ///
    /// Priority: --data flag > config file value.
    pub fn resolve_inventory_path(&self, config_value: &str) -> PathBuf {
        if let Some(ref p) = self.data {
            return p.clone();
        }
        expand_home(config_value)
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_value: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_value.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".predio").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".predio").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        #[cfg(target_os = "windows")]
        if let Ok(home) = std::env::var("USERPROFILE") {
            return PathBuf::from(home).join(rest);
        }
        #[cfg(not(target_os = "windows"))]
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
