//! Service configuration.
//!
//! The config file is YAML:
//!
//! ```yaml
//! env: "dev"
//! storage_path: "storage/storage.db"
//! http_server:
//!   address: "localhost:8082"
//! ```
//!
//! Its path comes from the `CONFIG_PATH` environment variable, else the
//! `--config` flag, else `config/production.yaml` under the working
//! directory. Every key is required. A non-empty `ENV` environment variable
//! overrides `env`.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";
pub const ENV_VAR: &str = "ENV";

const DEFAULT_CONFIG: &str = "config/production.yaml";

/// Command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(version, about = "Student records over HTTP")]
pub struct Cli {
    /// Path to the YAML config file (ignored when CONFIG_PATH is set).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error("cannot parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// HTTP listener settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct HttpServerConfig {
    /// `host:port`; host names are allowed.
    pub address: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Config {
    pub env: String,
    pub storage_path: String,
    pub http_server: HttpServerConfig,
}

impl Config {
    /// Resolves the config path from the process environment and `cli`,
    /// then loads it.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path = resolve_path(
            std::env::var(CONFIG_PATH_VAR).ok(),
            cli.config.clone(),
            std::env::current_dir,
        )?;

        let mut config = Self::from_file(&path)?;
        config.override_env(std::env::var(ENV_VAR).ok());
        Ok(config)
    }

    /// Reads and parses one YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    fn override_env(&mut self, env: Option<String>) {
        if let Some(env) = env.filter(|e| !e.is_empty()) {
            self.env = env;
        }
    }
}

/// Env var first, then flag, then the default under the working directory.
/// Empty values count as unset. `cwd` is only consulted for the default.
fn resolve_path(
    env: Option<String>,
    flag: Option<PathBuf>,
    cwd: impl FnOnce() -> std::io::Result<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = env.filter(|p| !p.is_empty()).map(PathBuf::from) {
        return Ok(path);
    }
    if let Some(path) = flag.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let cwd = cwd().map_err(ConfigError::WorkingDir)?;
    Ok(cwd.join(DEFAULT_CONFIG))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
env: "dev"
storage_path: "storage/storage.db"
http_server:
  address: "localhost:8082"
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_complete_file() {
        let file = write_config(SAMPLE);
        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(
            config,
            Config {
                env: "dev".into(),
                storage_path: "storage/storage.db".into(),
                http_server: HttpServerConfig { address: "localhost:8082".into() },
            }
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Config::from_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let file = write_config("env: dev\nstorage_path: x.db\n");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    fn srv() -> std::io::Result<PathBuf> {
        Ok(PathBuf::from("/srv"))
    }

    fn no_cwd() -> std::io::Result<PathBuf> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "cwd removed"))
    }

    #[test]
    fn env_var_wins_over_flag_and_default() {
        let path = resolve_path(
            Some("/etc/students/env.yaml".into()),
            Some("/etc/students/flag.yaml".into()),
            srv,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/etc/students/env.yaml"));
    }

    #[test]
    fn flag_is_used_when_env_var_is_unset_or_empty() {
        for env in [None, Some(String::new())] {
            let path = resolve_path(env, Some("flag.yaml".into()), no_cwd).unwrap();
            assert_eq!(path, PathBuf::from("flag.yaml"));
        }
    }

    #[test]
    fn falls_back_to_default_under_working_directory() {
        let path = resolve_path(None, None, srv).unwrap();
        assert_eq!(path, PathBuf::from("/srv/config/production.yaml"));
    }

    #[test]
    fn unreadable_working_directory_is_an_error() {
        let err = resolve_path(None, None, no_cwd).unwrap_err();
        assert!(matches!(err, ConfigError::WorkingDir(_)));
        assert!(err.to_string().contains("cwd removed"));
    }

    #[test]
    fn non_empty_env_overrides_file_value() {
        let file = write_config(SAMPLE);
        let mut config = Config::from_file(file.path()).unwrap();

        config.override_env(Some(String::new()));
        assert_eq!(config.env, "dev");

        config.override_env(Some("production".into()));
        assert_eq!(config.env, "production");
    }

    #[test]
    fn cli_accepts_config_flag() {
        let cli = Cli::parse_from(["students-api", "--config", "local.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("local.yaml")));
    }
}
