//! Configuration module
//!
//! Handles parser settings and the extra catalogs loaded at startup

mod settings;

pub use settings::{ConfigError, ParserConfig, ProtocolSource, CONFIG_FILE};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "nmeascope", "NMEAScope")
        .map(|dirs| dirs.config_dir().to_path_buf())
}
