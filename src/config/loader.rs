// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::consts::DEFAULT_LOG_FILTER;
use crate::errors::ConfigError;
use crate::observability::messages::registry::ConfigLoaded;
use crate::observability::messages::StructuredLog;

/// Top-level configuration file.
///
/// Every section and field is optional; missing values take their defaults.
///
/// # Example
/// ```yaml
/// engine:
///   selection: strict
/// logging:
///   filter: "the_canopy=debug"
///   format: compact
///   with_target: false
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineOptions,
    pub logging: LoggingConfig,
}

/// Options shared by every processor built from this configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineOptions {
    pub selection: SelectionPolicy,
}

/// How a processor picks among candidate state machines and syncers.
///
/// # Variants
/// * `FirstMatch` - the first candidate, in configuration order, that accepts
///   the entity wins
/// * `Strict` - exactly one candidate may accept the entity; more than one
///   fails with `AmbiguousCandidates`
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    FirstMatch,
    Strict,
}

/// Settings for [`init_tracing`](crate::observability::init_tracing).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `"info,the_canopy=debug"`.
    pub filter: String,
    pub format: LogFormat,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
        }
    }
}

/// Load a configuration file, choosing the parser by extension.
///
/// # Errors
/// * `UnsupportedFormat` for anything but `.yaml`, `.yml` or `.toml`
/// * `Io` if the file cannot be read
/// * `Yaml` / `Toml` if the contents do not parse
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        ConfigFormat::Toml => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
    };

    ConfigLoaded {
        path: &path.display().to_string(),
        format: format.as_str(),
    }
    .log();

    Ok(config)
}
