//! Configuration loading
//!
//! Settings come from an optional TOML file. Every key is optional; anything
//! left out keeps its built-in default.
//!
//! ```toml
//! [source]
//! backend_url = "http://localhost:5000/api"
//! algorithm = "interval-coverage"
//! request_timeout_secs = 10
//!
//! [playback]
//! autoplay_interval_ms = 1200
//!
//! [logging]
//! filter = "warn"
//! directory = "/tmp/intervis"
//! ```

use crate::replay::DEFAULT_AUTOPLAY_INTERVAL;
use crate::source::DEFAULT_REQUEST_TIMEOUT;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub backend_url: String,
    /// Catalog id; `None` posts to the plain `/trace` route
    pub algorithm: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub autoplay_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    pub directory: PathBuf,
}

impl LoggingConfig {
    pub fn log_file(&self) -> PathBuf {
        self.directory.join("intervis.log")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    pub playback: PlaybackConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                backend_url: DEFAULT_BACKEND_URL.to_string(),
                algorithm: None,
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            },
            playback: PlaybackConfig {
                autoplay_interval: DEFAULT_AUTOPLAY_INTERVAL,
            },
            logging: LoggingConfig {
                filter: "warn".to_string(),
                directory: default_log_dir(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlSourceConfig {
    pub backend_url: Option<String>,
    pub algorithm: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlPlaybackConfig {
    pub autoplay_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlLoggingConfig {
    pub filter: Option<String>,
    pub directory: Option<PathBuf>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub source: Option<TomlSourceConfig>,
    pub playback: Option<TomlPlaybackConfig>,
    pub logging: Option<TomlLoggingConfig>,
}

impl Config {
    /// Load from `path`, or from [`default_config_path`] when `None`.
    ///
    /// A missing default file yields the defaults. A missing file that was
    /// named explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Config::default()),
            },
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok(Config::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let toml_config = toml::from_str::<TomlConfig>(&contents)
            .map_err(|source| ConfigError::Parse { path, source })?;
        Config::default().merged(toml_config)
    }

    /// Overlay the keys present in `toml_config` on top of `self`
    pub fn merged(mut self, toml_config: TomlConfig) -> Result<Self, ConfigError> {
        if let Some(source) = toml_config.source {
            if let Some(url) = source.backend_url {
                if url.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "source.backend_url",
                        reason: "must not be empty".to_string(),
                    });
                }
                self.source.backend_url = url;
            }
            if let Some(algorithm) = source.algorithm {
                self.source.algorithm = Some(algorithm).filter(|id| !id.is_empty());
            }
            if let Some(secs) = source.request_timeout_secs {
                self.source.request_timeout = positive_duration(
                    "source.request_timeout_secs",
                    Duration::from_secs(secs),
                )?;
            }
        }

        if let Some(playback) = toml_config.playback {
            if let Some(ms) = playback.autoplay_interval_ms {
                self.playback.autoplay_interval = positive_duration(
                    "playback.autoplay_interval_ms",
                    Duration::from_millis(ms),
                )?;
            }
        }

        if let Some(logging) = toml_config.logging {
            if let Some(filter) = logging.filter {
                self.logging.filter = filter;
            }
            if let Some(directory) = logging.directory {
                self.logging.directory = directory;
            }
        }

        Ok(self)
    }
}

fn positive_duration(key: &'static str, value: Duration) -> Result<Duration, ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// `<config dir>/intervis/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("intervis").join("config.toml"))
}

fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("intervis")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(contents: &str) -> Result<Config, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents).unwrap();
        Config::default().merged(toml_config)
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse("[playback]\nautoplay_interval_ms = 400\n").unwrap();
        assert_eq!(config.playback.autoplay_interval, Duration::from_millis(400));
        assert_eq!(config.source, Config::default().source);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_source_section() {
        let config = parse(
            r#"
            [source]
            backend_url = "http://trace.internal:8080/api"
            algorithm = "interval-coverage"
            request_timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.source.backend_url, "http://trace.internal:8080/api");
        assert_eq!(config.source.algorithm.as_deref(), Some("interval-coverage"));
        assert_eq!(config.source.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = parse("[playback]\nautoplay_interval_ms = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "playback.autoplay_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nfilter = \"intervis=debug\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.filter, "intervis=debug");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[playback\nautoplay_interval_ms = ").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
