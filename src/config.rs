//! Configuration for the input tally daemon.
//!
//! The configuration file is plain text: the first line that is neither
//! blank nor a `#` comment names the output directory. Everything after it
//! is ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::DEFAULT_TICK;

/// File name looked up next to the executable and in the user config dir.
pub const CONFIG_FILE_NAME: &str = "input-tally.txt";

/// Largest accepted tick.
const MAX_TICK: Duration = Duration::from_secs(1);

/// Main configuration for the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory receiving the hourly CSV and lock files
    pub output_dir: PathBuf,

    /// Bounded wait per loop iteration
    #[serde(with = "duration_millis")]
    pub tick: Duration,
}

impl Config {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tick: DEFAULT_TICK,
        }
    }

    /// Parse the contents of a configuration file.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Self::new)
            .ok_or(ConfigError::MissingOutputDir)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Load configuration from `explicit` if given, else from the first
    /// default location that exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidates = Self::default_paths();
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(path),
            None => Err(ConfigError::NotFound(candidates)),
        }
    }

    /// Default configuration file locations, in lookup order.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            paths.push(dir.join(CONFIG_FILE_NAME));
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("input-tally").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Set the tick from milliseconds.
    pub fn with_tick_ms(mut self, millis: u64) -> Result<Self, ConfigError> {
        let tick = Duration::from_millis(millis);
        if tick.is_zero() || tick > MAX_TICK {
            return Err(ConfigError::InvalidTick(millis));
        }
        self.tick = tick;
        Ok(self)
    }

    /// Check that the output directory exists and is a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::OutputDirMissing(self.output_dir.clone()))
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no config file found (looked in {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),
    #[error("config file does not name an output directory")]
    MissingOutputDir,
    #[error("output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),
    #[error("tick must be between 1 and 1000 ms, got {0}")]
    InvalidTick(u64),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_first_line() {
        let config = Config::parse("/var/lib/input-tally\n").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/var/lib/input-tally"));
        assert_eq!(config.tick, Duration::from_millis(10));
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let config = Config::parse("\n# where rows go\n   /data/tally  \r\nignored\n").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/data/tally"));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(
            Config::parse("\n  \n# nothing\n"),
            Err(ConfigError::MissingOutputDir)
        ));
    }

    #[test]
    fn test_from_file_and_validate() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, format!("{}\n", dir.path().display())).unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.output_dir, dir.path());
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_validate_rejects_missing_or_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"").unwrap();

        assert!(matches!(
            Config::new(dir.path().join("missing")).validate(),
            Err(ConfigError::OutputDirMissing(_))
        ));
        assert!(Config::new(&file).validate().is_err());
    }

    #[test]
    fn test_tick_bounds() {
        let config = Config::new("/tmp");
        assert_eq!(
            config.clone().with_tick_ms(25).unwrap().tick,
            Duration::from_millis(25)
        );
        assert!(matches!(
            config.clone().with_tick_ms(0),
            Err(ConfigError::InvalidTick(0))
        ));
        assert!(config.with_tick_ms(1001).is_err());
    }

    #[test]
    fn test_serializes_tick_as_millis() {
        let json = serde_json::to_value(Config::new("/tmp/out")).unwrap();
        assert_eq!(json["tick"], 10);
        assert_eq!(json["output_dir"], "/tmp/out");

        let back: Config = serde_json::from_value(json).unwrap();
        assert_eq!(back, Config::new("/tmp/out"));
    }
}
