//! Session File Loading
//!
//! Finds and loads session files (TOML or JSON) from an explicit path or
//! the default search locations.

use super::SessionConfig;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a session file
pub const CONFIG_ENV_VAR: &str = "INSTALLER_HARNESS_CONFIG";

const APP_DIR: &str = "installer-harness";

/// Session file loader
pub struct ConfigLoader {
    /// Search paths for session files, without extension
    search_paths: Vec<PathBuf>,
    /// Supported session file formats, in preference order
    supported_formats: Vec<ConfigFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Format implied by a file extension; TOML unless it says `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

impl ConfigLoader {
    /// Create a loader over the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
        }
    }

    /// Create a loader over custom search paths
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
        }
    }

    /// Load from `$INSTALLER_HARNESS_CONFIG` or the first search path that has a file
    pub fn load() -> Result<SessionConfig> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::load_from_path(Path::new(&path));
        }

        let loader = Self::new();
        match loader.find_and_load_config()? {
            Some((path, config)) => {
                info!("Loaded session file {}", path.display());
                Ok(config)
            }
            None => Err(Error::ConfigNotFound),
        }
    }

    /// Load, resolve, and validate a specific session file
    pub fn load_from_path(path: &Path) -> Result<SessionConfig> {
        if !path.exists() {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: "Session file does not exist".to_string(),
            });
        }

        let mut config = Self::load_config_file(path, ConfigFormat::from_path(path))?;

        let base = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        config.resolve_relative_to(&base);
        config.validate()?;

        Ok(config)
    }

    /// Write a session file, format chosen by extension
    pub fn save_to_path(config: &SessionConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSaveFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSaveFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Find and load the first session file in the search paths
    pub fn find_and_load_config(&self) -> Result<Option<(PathBuf, SessionConfig)>> {
        for base in &self.search_paths {
            for format in &self.supported_formats {
                let config_path = base.with_extension(format.extension());
                if !config_path.exists() {
                    continue;
                }

                match Self::load_from_path(&config_path) {
                    Ok(config) => return Ok(Some((config_path, config))),
                    Err(e) => {
                        warn!(
                            "Failed to load session file {}: {}",
                            config_path.display(),
                            e
                        );
                        continue;
                    }
                }
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path, format: ConfigFormat) -> Result<SessionConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let parsed: std::result::Result<SessionConfig, String> = match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| Error::ConfigParseFailed {
            format: format.name().to_string(),
            reason,
        })
    }

    /// Default search paths, without extension
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current working directory first
        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join(APP_DIR));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join("session"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{}", APP_DIR)).join("session"));
        }

        paths
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
