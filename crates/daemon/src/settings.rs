//! Server configuration
//!
//! Layered: built-in defaults, then `cgsg.toml` (or the file named by
//! `CGSG_CONFIG`), then `CGSG_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_DB_PATH: &str = "~/.cgsg/cgsg.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_CONFIG_FILE: &str = "cgsg.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    /// Seeded as an admin API token on startup
    #[serde(default)]
    pub admin_token: Option<String>,
    pub log_format: LogFormat,
    /// Rolling log file directory; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("CGSG_CONFIG").ok().map(PathBuf::from);
        Self::from_sources(explicit.as_deref(), Environment::with_prefix("CGSG"))
    }

    /// Build from an optional explicit file and an environment source.
    /// An explicit file must exist; the default `cgsg.toml` may be absent.
    pub fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::from(PathBuf::from(DEFAULT_CONFIG_FILE)).required(false),
        };

        Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("log_format", "pretty")?
            .add_source(file_source)
            .add_source(env.ignore_empty(true))
            .build()?
            .try_deserialize()
    }

    /// sqlx URL for `db_path` (tilde-expanded; `sqlite:` URLs pass through)
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            return self.db_path.clone();
        }
        format!("sqlite://{}", shellexpand::tilde(&self.db_path))
    }

    /// Directory that must exist before the database file is created
    pub fn database_dir(&self) -> Option<PathBuf> {
        if self.db_path.starts_with("sqlite:") {
            return None;
        }
        let expanded = shellexpand::tilde(&self.db_path).into_owned();
        Path::new(&expanded)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }
}
