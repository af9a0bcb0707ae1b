//! VX Configuration
//!
//! Loads `vxshader.toml`, either from an explicit path or from the working
//! directory, and maps it onto preprocessor options. Every section and key is
//! optional; missing values take the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use vx_preprocess::{BuildTarget, DirectiveMatching, PreprocessOptions};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "vxshader.toml";

/// Preprocessor section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Build target for platform gates (omitted: the host target)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BuildTarget>,

    /// Directive keyword matching
    #[serde(default)]
    pub directive_matching: DirectiveMatching,

    /// Skip includes that would recurse into a file already being resolved
    #[serde(default = "default_detect_include_cycles")]
    pub detect_include_cycles: bool,
}

fn default_detect_include_cycles() -> bool {
    true
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target: None,
            directive_matching: DirectiveMatching::default(),
            detect_include_cycles: default_detect_include_cycles(),
        }
    }
}

/// Output section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extension for the written vertex stage
    #[serde(default = "default_vertex_extension")]
    pub vertex_extension: String,

    /// Extension for the written fragment stage
    #[serde(default = "default_fragment_extension")]
    pub fragment_extension: String,

    /// Directory for written stages (omitted: next to the input)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_vertex_extension() -> String {
    "vert".to_string()
}

fn default_fragment_extension() -> String {
    "frag".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            vertex_extension: default_vertex_extension(),
            fragment_extension: default_fragment_extension(),
            directory: None,
        }
    }
}

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    /// Parsed level, falling back to `Info` for unrecognised names
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info", self.level);
            log::LevelFilter::Info
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub preprocess: PreprocessConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::ReadError(path.to_path_buf(), e)
            }
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load `explicit` if given, else `vxshader.toml` in `dir` if present,
    /// else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load_from(&candidate)
        } else {
            log::debug!("No {} in {:?}, using defaults", CONFIG_FILE_NAME, dir);
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `path`
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(&Config::default()).map_err(ConfigError::SerializeError)?;

        let content = format!(
            "# vxshader configuration\n\
             #\n\
             # [preprocess] target = \"native\" | \"emscripten\" (default: host)\n\
             \n\
             {toml_content}"
        );

        fs::write(path, content).map_err(|e| ConfigError::WriteError(path.to_path_buf(), e))?;
        log::info!("Created default configuration at {:?}", path);
        Ok(())
    }

    /// Build target for platform gates
    pub fn target(&self) -> BuildTarget {
        self.preprocess.target.unwrap_or_else(BuildTarget::host)
    }

    /// Preprocessor options described by this configuration
    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            target: self.target(),
            matching: self.preprocess.directive_matching,
            detect_cycles: self.preprocess.detect_include_cycles,
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Explicitly requested file does not exist
    NotFound(PathBuf),
    /// Failed to read config file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config file
    ParseError(PathBuf, toml::de::Error),
    /// Failed to serialize config
    SerializeError(toml::ser::Error),
    /// Failed to write config file
    WriteError(PathBuf, std::io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Config file {:?} does not exist", path),
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::WriteError(path, e) => write!(f, "Failed to write {:?}: {}", path, e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound(_) => None,
            ConfigError::ReadError(_, e) | ConfigError::WriteError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::SerializeError(e) => Some(e),
        }
    }
}
