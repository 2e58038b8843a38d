use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_API_BASE_URL, ENV_PREFIX, HTTP_REQUEST_TIMEOUT_SECS,
    IMAGE_CONNECT_TIMEOUT_SECS, IMAGE_JPEG_QUALITY, IMAGE_MEMORY_CAPACITY,
    IMAGE_READ_TIMEOUT_SECS, IMAGE_USER_AGENT, TOKEN_FILE_NAME,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Image cache configuration
    #[serde(default)]
    pub images: ImageConfig,

    /// Where caches and the session token live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every API path is appended to
    pub base_url: String,
    /// Total timeout for a single JSON request
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Image cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Sent as the User-Agent header on image downloads
    pub user_agent: String,
    /// Decoded images kept in memory
    pub memory_capacity: usize,
    /// JPEG quality for the disk tier
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: IMAGE_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: IMAGE_READ_TIMEOUT_SECS,
            user_agent: IMAGE_USER_AGENT.to_string(),
            memory_capacity: IMAGE_MEMORY_CAPACITY,
            jpeg_quality: IMAGE_JPEG_QUALITY,
        }
    }
}

/// Storage locations; `None` means the platform default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub cache_dir: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved cache directory
    pub fn resolve_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_cache_dir(),
        }
    }

    /// Resolved token file path
    pub fn resolve_token_file(&self) -> Result<PathBuf> {
        match &self.token_file {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join(TOKEN_FILE_NAME)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join(CONFIG_FILE_NAME);
    let local_config = PathBuf::from(".campus").join(CONFIG_FILE_NAME);
    load_config_from(&[global_config, local_config])
}

/// Load configuration from the given TOML files (later files win), then env
pub fn load_config_from(files: &[PathBuf]) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // CAMPUS_API__BASE_URL -> api.base_url
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

fn home_fallback(parts: &[&str]) -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    let mut dir = PathBuf::from(home);
    for part in parts {
        dir.push(part);
    }
    Ok(dir)
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    Ok(dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let dir = match project_dirs() {
        Some(dirs) => dirs.config_dir().to_path_buf(),
        None => home_fallback(&[".config", APP_NAME])?,
    };
    ensure_dir(dir)
}

/// Get the cache directory (~/.cache/campus on Linux)
pub fn get_cache_dir() -> Result<PathBuf> {
    let dir = match project_dirs() {
        Some(dirs) => dirs.cache_dir().to_path_buf(),
        None => home_fallback(&[".cache", APP_NAME])?,
    };
    ensure_dir(dir)
}

/// Get the data directory holding the session token
pub fn get_data_dir() -> Result<PathBuf> {
    let dir = match project_dirs() {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => home_fallback(&[".local", "share", APP_NAME])?,
    };
    ensure_dir(dir)
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join(CONFIG_FILE_NAME),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path of the configuration file.
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join(CONFIG_FILE_NAME);
    init_config_at(&config_file)?;
    Ok(config_file)
}

fn init_config_at(config_file: &Path) -> Result<bool> {
    if config_file.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(config_file.to_path_buf()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.images.memory_capacity, 50);
        assert_eq!(config.images.jpeg_quality, 85);
        assert_eq!(config.images.connect_timeout_secs, 10);
        assert_eq!(config.images.read_timeout_secs, 10);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
[api]
base_url = "https://lms.example.edu/api"
request_timeout_secs = 15

[storage]
cache_dir = "/tmp/campus-cache"
"#,
        )
        .unwrap();

        let config = load_config_from(&[file]).unwrap();
        assert_eq!(config.api.base_url, "https://lms.example.edu/api");
        assert_eq!(config.api.request_timeout_secs, 15);
        assert_eq!(
            config.storage.cache_dir,
            Some(PathBuf::from("/tmp/campus-cache"))
        );
        // untouched sections keep their defaults
        assert_eq!(config.images, ImageConfig::default());
    }

    #[test]
    fn test_save_then_init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested").join("config.toml");

        assert!(init_config_at(&file).unwrap());
        assert!(!init_config_at(&file).unwrap());

        let loaded = load_config_from(&[file]).unwrap();
        assert_eq!(loaded.api, ApiConfig::default());
    }

    #[test]
    fn test_storage_overrides_resolve_verbatim() {
        let storage = StorageConfig {
            cache_dir: Some(PathBuf::from("/var/cache/campus")),
            token_file: Some(PathBuf::from("/var/lib/campus/token")),
        };
        assert_eq!(
            storage.resolve_cache_dir().unwrap(),
            PathBuf::from("/var/cache/campus")
        );
        assert_eq!(
            storage.resolve_token_file().unwrap(),
            PathBuf::from("/var/lib/campus/token")
        );
    }
}
