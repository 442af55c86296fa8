//! Parser settings

use crate::core::parser::DEFAULT_BUFFER_LIMIT;
use crate::core::protocol_dsl::{ProtocolError, ProtocolsInput};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file name inside the configuration directory
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for [`ParserConfig`]
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No home directory to derive the config location from
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// A configured catalog failed to load
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Extra catalog to merge at startup
///
/// Exactly one of `file` and `content` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSource {
    /// Path to a protocols YAML file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Inline protocols YAML
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ProtocolSource {
    /// Source reading `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { file: Some(path.into()), content: None }
    }

    /// Source holding inline YAML
    pub fn content(yaml: impl Into<String>) -> Self {
        Self { file: None, content: Some(yaml.into()) }
    }

    /// Convert to parser input, checking that exactly one field is set
    pub fn to_input(&self) -> Result<ProtocolsInput, ProtocolError> {
        ProtocolsInput::from_parts(self.file.clone(), self.content.clone(), None)
    }
}

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Carry unterminated frames between chunks
    pub memory: bool,
    /// Carry buffer capacity in characters
    pub buffer_limit: usize,
    /// Catalogs merged after the standard one, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<ProtocolSource>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            memory: true,
            buffer_limit: DEFAULT_BUFFER_LIMIT,
            protocols: Vec::new(),
        }
    }
}

impl ParserConfig {
    /// Default settings file location
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        super::config_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from `path`
    ///
    /// Relative catalog paths are resolved against the directory holding
    /// the config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            for source in &mut config.protocols {
                if let Some(file) = source.file.as_mut() {
                    if file.is_relative() && !file.as_os_str().is_empty() {
                        *file = base.join(&*file);
                    }
                }
            }
        }
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
