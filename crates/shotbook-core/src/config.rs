//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/shotbook/config.toml)
//! 3. Environment variables (SHOTBOOK_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "SHOTBOOK";

/// Image limit of the full product variant
pub const DEFAULT_MAX_IMAGES: usize = 9;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db, session)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Most images a submission may carry (9, or 3 for the lite variant)
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Put presets found only in the database back into the cache
    #[serde(default = "default_true")]
    pub backfill_on_fallback: bool,

    /// Leave out undecodable rows when listing instead of failing
    #[serde(default)]
    pub skip_corrupt_rows: bool,

    /// How long SQLite waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_images: DEFAULT_MAX_IMAGES,
            backfill_on_fallback: true,
            skip_corrupt_rows: false,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Config {
    /// Configuration rooted at `data_dir` with every other value defaulted
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SHOTBOOK_DATA_DIR, SHOTBOOK_MAX_IMAGES, ...)
    /// 2. Config file (~/.config/shotbook/config.toml or SHOTBOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // SHOTBOOK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // SHOTBOOK_MAX_IMAGES, ignored unless it parses
        if let Ok(val) = std::env::var(format!("{}_MAX_IMAGES", ENV_PREFIX)) {
            if let Ok(max) = val.parse() {
                self.max_images = max;
            }
        }

        // SHOTBOOK_BACKFILL
        if let Ok(val) = std::env::var(format!("{}_BACKFILL", ENV_PREFIX)) {
            self.backfill_on_fallback = parse_flag(&val);
        }

        // SHOTBOOK_SKIP_CORRUPT_ROWS
        if let Ok(val) = std::env::var(format!("{}_SKIP_CORRUPT_ROWS", ENV_PREFIX)) {
            self.skip_corrupt_rows = parse_flag(&val);
        }

        // SHOTBOOK_BUSY_TIMEOUT_MS, ignored unless it parses
        if let Ok(val) = std::env::var(format!("{}_BUSY_TIMEOUT_MS", ENV_PREFIX)) {
            if let Ok(ms) = val.parse() {
                self.busy_timeout_ms = ms;
            }
        }
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SHOTBOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shotbook")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("camera_params.db")
    }

    /// Get the path to the saved login session
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shotbook")
}

fn default_max_images() -> usize {
    DEFAULT_MAX_IMAGES
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "SHOTBOOK_DATA_DIR",
        "SHOTBOOK_MAX_IMAGES",
        "SHOTBOOK_BACKFILL",
        "SHOTBOOK_SKIP_CORRUPT_ROWS",
        "SHOTBOOK_BUSY_TIMEOUT_MS",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_images, 9);
        assert!(config.backfill_on_fallback);
        assert!(!config.skip_corrupt_rows);
        assert!(config.data_dir.ends_with("shotbook"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::with_data_dir("/data/shotbook");
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/data/shotbook/camera_params.db")
        );
        assert!(config.session_path().ends_with("session.json"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHOTBOOK_DATA_DIR", "/tmp/shotbook-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/shotbook-test"));
    }

    #[test]
    fn test_env_override_max_images() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHOTBOOK_MAX_IMAGES", "3");
        config.apply_env_overrides();
        assert_eq!(config.max_images, 3);

        // Garbage is ignored
        env::set_var("SHOTBOOK_MAX_IMAGES", "many");
        config.apply_env_overrides();
        assert_eq!(config.max_images, 3);
    }

    #[test]
    fn test_env_override_flags() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHOTBOOK_BACKFILL", "false");
        env::set_var("SHOTBOOK_SKIP_CORRUPT_ROWS", "1");
        config.apply_env_overrides();

        assert!(!config.backfill_on_fallback);
        assert!(config.skip_corrupt_rows);
    }

    #[test]
    fn test_env_override_busy_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("SHOTBOOK_BUSY_TIMEOUT_MS", "250");
        config.apply_env_overrides();
        assert_eq!(config.busy_timeout_ms, 250);

        env::set_var("SHOTBOOK_BUSY_TIMEOUT_MS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/shotbook"),
            max_images: 3,
            backfill_on_fallback: false,
            skip_corrupt_rows: true,
            busy_timeout_ms: 250,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("max_images"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.max_images, 3);
        assert!(!parsed.backfill_on_fallback);
        assert!(parsed.skip_corrupt_rows);
        assert_eq!(parsed.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"data_dir = "/custom/data""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.max_images, DEFAULT_MAX_IMAGES);
        assert!(config.backfill_on_fallback);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_path(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.max_images, DEFAULT_MAX_IMAGES);
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            max_images: 3,
            ..Config::with_data_dir(temp_dir.path())
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.max_images, 3);
        assert_eq!(loaded.data_dir, temp_dir.path());
    }
}
