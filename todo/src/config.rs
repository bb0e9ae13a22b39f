//! Configuration for the todo binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::persistence::TODOS_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "todo=info,todo_store_runtime=info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Persistence configuration
    pub storage: StorageConfig,
    /// Log filter (`RUST_LOG` syntax)
    pub log_level: String,
}

/// Persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File backing the key-value storage
    pub path: PathBuf,
    /// Slot key the list is written under
    pub key: String,
    /// Load the persisted list at startup
    pub rehydrate: bool,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            storage: StorageConfig {
                path: lookup("TODO_STORAGE_PATH")
                    .filter(|s| !s.trim().is_empty())
                    .map_or_else(|| PathBuf::from("todos.json"), PathBuf::from),
                key: lookup("TODO_STORAGE_KEY")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| TODOS_STORAGE_KEY.to_string()),
                rehydrate: lookup("TODO_REHYDRATE")
                    .and_then(|s| parse_flag(&s))
                    .unwrap_or(true),
            },
            log_level: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
