//! CLI settings: flags and environment over the config file over defaults.
//!
//! The config file is TOML:
//!
//! ```toml
//! ollama_url = "http://gpu-box:11434"
//! model = "mistral"
//! server_path = "/opt/mcpdemo/bin/mcpdemo-server"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use mcpdemo::bridge::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use mcpdemo_core::logging::{debug, targets};
use mcpdemo_core::{McpError, McpResult};

/// File name of the host binary, looked up next to the running executable.
const SERVER_BINARY: &str = "mcpdemo-server";

/// Values read from the config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub ollama_url: Option<String>,
    pub model: Option<String>,
    pub server_path: Option<PathBuf>,
}

impl FileConfig {
    /// `<config dir>/mcpdemo/config.toml`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mcpdemo").join("config.toml"))
    }

    /// Parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load(path: &Path) -> McpResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            McpError::internal_error(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            McpError::internal_error(format!("Invalid config {}: {e}", path.display()))
        })
    }

    /// Loads `explicit` if given (it must exist), else the default path if
    /// it exists, else an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be read cannot be parsed.
    pub fn discover(explicit: Option<&Path>) -> McpResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!(target: targets::MCPDEMO, "Using config {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ollama_url: String,
    pub model: String,
    pub server_path: PathBuf,
}

/// Values given on the command line or through `MCPDEMO_*` variables.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub ollama_url: Option<String>,
    pub model: Option<String>,
    pub server_path: Option<PathBuf>,
}

impl Settings {
    /// Layers `overrides` over `file` over the built-in defaults.
    #[must_use]
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        Self {
            ollama_url: overrides
                .ollama_url
                .or(file.ollama_url)
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model: overrides
                .model
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            server_path: overrides
                .server_path
                .or(file.server_path)
                .unwrap_or_else(default_server_path),
        }
    }
}

/// The host binary beside the running executable, or a bare name for a
/// `PATH` lookup when that cannot be determined.
fn default_server_path() -> PathBuf {
    let name = format!("{SERVER_BINARY}{}", std::env::consts::EXE_SUFFIX);
    match std::env::current_exe() {
        Ok(exe) => exe.with_file_name(name),
        Err(_) => PathBuf::from(name),
    }
}
