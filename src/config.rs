use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compose::ComposePolicy;
use crate::error::ConfigError;
use crate::protocol::ScriptProtocol;
use crate::relaxed::{DelimiterPolicy, RelaxedFormat};

/// Codec settings. Every field defaults to the behavior of the scripts
/// already in circulation, so an empty file is a valid configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub compose_policy: ComposePolicy,
    pub delimiter_policy: DelimiterPolicy,
    pub protocol: ScriptProtocol,
}

impl CodecConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.protocol.validate()
    }

    pub fn format(&self) -> RelaxedFormat {
        RelaxedFormat::new(self.protocol.delimiter, self.delimiter_policy)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
