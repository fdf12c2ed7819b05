//! # History File Management
//!
//! Interactive sessions keep their line history in `~/.bagdb_history`.
//!
//! ## Configuration
//!
//! The location can be overridden with the `BAGDB_HISTORY` environment
//! variable:
//!
//! ```bash
//! export BAGDB_HISTORY=/custom/path/history
//! bagdb ./words.bag
//! ```
//!
//! Setting `BAGDB_HISTORY` to an empty string disables history persistence.
//! Batch sessions never read or write history.

use std::env;
use std::path::PathBuf;

use crate::config::{DEFAULT_HISTORY_FILE, HISTORY_ENV_VAR};

pub fn history_path() -> Option<PathBuf> {
    resolve_history_path(env::var(HISTORY_ENV_VAR).ok(), home_dir())
}

/// Picks the history file from the override variable and the home directory.
pub fn resolve_history_path(custom: Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
    match custom {
        Some(path) if path.is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => home.map(|home| home.join(DEFAULT_HISTORY_FILE)),
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}
