use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::intern::InternPolicy;

/// Environment variable naming the TOML configuration file.
pub const CONFIG_ENV: &str = "CROSSWALK_CONFIG";

/// Process-wide configuration, built once at startup and passed by reference
/// into the store gateway and the branch manager.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub dataset: String,
    /// Directory holding the backing store's database files.
    pub db_dir: PathBuf,
    /// Version-controlled working tree holding the graph snapshot files.
    pub static_dir: PathBuf,
    /// How to launch the store when it is managed as a local subprocess.
    pub launch: Option<LaunchConfig>,
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
    pub lock_retries: u32,
    pub lock_interval_ms: u64,
    pub intern_retries: u32,
    /// Hydration worker pool size.
    pub workers: usize,
    pub bot_name: String,
    pub bot_email: String,
    /// Header written at the top of every snapshot file.
    pub license: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3131,
            dataset: "crosswalk".into(),
            db_dir: PathBuf::new(),
            static_dir: PathBuf::new(),
            launch: None,
            poll_attempts: 20,
            poll_interval_ms: 500,
            lock_retries: 40,
            lock_interval_ms: 250,
            intern_retries: 3,
            workers: 8,
            bot_name: "crosswalk-bot".into(),
            bot_email: "bot@crosswalk.dev".into(),
            license: "Licensed under the Creative Commons Attribution 4.0 International license.".into(),
        }
    }
}

/// Command used to run the store as a managed subprocess.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `CROSSWALK_CONFIG`.
    pub fn from_env() -> StoreResult<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .ok_or_else(|| StoreError::Config(format!("{CONFIG_ENV} is not set")))?;
        Self::load(Path::new(&path))
    }

    /// Check that every required value is present.
    pub fn validate(&self) -> StoreResult<()> {
        if self.host.is_empty() {
            return Err(StoreError::Config("host must not be empty".into()));
        }
        if self.dataset.is_empty() {
            return Err(StoreError::Config("dataset must not be empty".into()));
        }
        if self.db_dir.as_os_str().is_empty() {
            return Err(StoreError::Config("db_dir is required".into()));
        }
        if self.static_dir.as_os_str().is_empty() {
            return Err(StoreError::Config("static_dir is required".into()));
        }
        if self.workers == 0 {
            return Err(StoreError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }

    /// Base URL of the dataset: `http://{host}:{port}/{dataset}`.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, self.dataset)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lock_interval(&self) -> Duration {
        Duration::from_millis(self.lock_interval_ms)
    }

    /// Retry policy for the get-or-create protocol.
    pub fn intern_policy(&self) -> InternPolicy {
        InternPolicy {
            retries: self.intern_retries,
            interval: self.poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            db_dir: "/tmp/db".into(),
            static_dir: "/tmp/static".into(),
            ..Config::default()
        }
    }

    #[test]
    fn default_config_requires_paths() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn endpoint_format() {
        assert_eq!(valid().endpoint(), "http://localhost:3131/crosswalk");
    }

    #[test]
    fn zero_workers_rejected() {
        let c = Config {
            workers: 0,
            ..valid()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalk.toml");
        std::fs::write(
            &path,
            r#"
port = 4040
db_dir = "/var/lib/crosswalk/db"
static_dir = "/var/lib/crosswalk/static"

[launch]
program = "fuseki-server"
args = ["--loc", "/var/lib/crosswalk/db", "/crosswalk"]
"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 4040);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.launch.unwrap().args.len(), 3);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = Config::load(Path::new("/nonexistent/crosswalk.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
