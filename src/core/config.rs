/*
 * Explorer configuration: which log level to run with, where datasource
 * structures are fetched from, which workspace to open, and whether datasource
 * nodes start out expanded. The configuration is a JSON document in the per-user
 * local config directory (see `path_utils`). A missing file yields defaults.
 *
 * Access goes through `ConfigManagerOperations` so the host and tests can swap
 * the storage location.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;

pub const APP_NAME: &str = "DatasourceExplorer";
const CONFIG_FILENAME: &str = "explorer_config.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration format error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine the configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            ConfigError::NoConfigDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /* One of `off`, `error`, `warn`, `info`, `debug`, `trace`. */
    pub log_level: String,
    /* Directory holding `<datasource id>.json` structure documents. */
    pub structure_dir: PathBuf,
    /* Workspace file with plugins, datasources and queries. */
    pub workspace_path: PathBuf,
    /* Caller-supplied default expansion for every datasource node. */
    pub default_expanded: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            log_level: "info".to_string(),
            structure_dir: PathBuf::from("structures"),
            workspace_path: PathBuf::from("workspace.json"),
            default_expanded: false,
        }
    }
}

impl ExplorerConfig {
    // Unknown level names fall back to `Info`.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self) -> Result<ExplorerConfig>;
}

/*
 * File-backed configuration. The file lives in the application's local config
 * directory; tests pin it elsewhere with `with_config_dir`.
 */
pub struct CoreConfigManager {
    config_dir_override: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            config_dir_override: None,
        }
    }

    #[cfg(test)]
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        CoreConfigManager {
            config_dir_override: Some(dir.into()),
        }
    }

    fn config_file_path(&self) -> Result<PathBuf> {
        match &self.config_dir_override {
            Some(dir) => {
                if !dir.exists() {
                    fs::create_dir_all(dir)?;
                }
                Ok(dir.join(CONFIG_FILENAME))
            }
            None => path_utils::config_file_path(APP_NAME, CONFIG_FILENAME)
                .ok_or(ConfigError::NoConfigDirectory),
        }
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self) -> Result<ExplorerConfig> {
        let file_path = self.config_file_path()?;
        if !file_path.exists() {
            log::debug!("CoreConfigManager: No config at {file_path:?}, using defaults.");
            return Ok(ExplorerConfig::default());
        }
        let reader = BufReader::new(File::open(&file_path)?);
        let config: ExplorerConfig = serde_json::from_reader(reader)?;
        log::debug!("CoreConfigManager: Loaded config from {file_path:?}: {config:?}");
        Ok(config)
    }
}
