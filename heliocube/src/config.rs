//! TOML configuration shared by the library front ends and the `diffrot` binary.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use common::log_setup::LogConfig;
use serde::{Deserialize, Serialize};

use crate::animation::AnimatorConfig;
use crate::error::{Error, Result};

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    /// Daily-rolling log files go here when set.
    pub log_directory: Option<PathBuf>,
    pub display: DisplayConfig,
    pub animation: AnimatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_directory: None,
            display: DisplayConfig::default(),
            animation: AnimatorConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), "Using default config: {err}");
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            directory: self.log_directory.clone(),
            ..LogConfig::default()
        }
    }

    fn validate(&self) -> Result<()> {
        self.display.validate()?;
        self.animation.validate()
    }
}

/// Presentation settings threaded into summaries and animation titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `strftime` pattern for observation times.
    pub time_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn new(time_format: impl Into<String>) -> Result<Self> {
        let config = Self {
            time_format: time_format.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if is_valid_format(&self.time_format) {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "invalid time_format '{}'",
                self.time_format
            )))
        }
    }

    /// Formats `time`; an invalid pattern falls back to RFC 3339.
    pub fn format_time(&self, time: &DateTime<Utc>) -> String {
        if is_valid_format(&self.time_format) {
            time.format(&self.time_format).to_string()
        } else {
            time.to_rfc3339()
        }
    }
}

fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.display.time_format, DEFAULT_TIME_FORMAT);
        assert_eq!(config.animation.interval_ms, 200);
    }

    #[test]
    fn test_parses_all_sections() {
        let config = Config::from_toml_str(
            r#"
            log_level = "debug"

            [display]
            time_format = "%H:%M"

            [animation]
            annotate = false
            interval_ms = 50
            resample = [0.5, 0.25]
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.display.time_format, "%H:%M");
        assert!(!config.animation.annotate);
        assert_eq!(config.animation.interval_ms, 50);
        assert_eq!(config.animation.resample, Some([0.5, 0.25]));
        assert_eq!(config.log_config().level, "debug");
    }

    #[test]
    fn test_rejects_bad_time_format() {
        let err = Config::from_toml_str("[display]\ntime_format = \"%Q\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::from_toml_str("log_level = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.animation.resample = Some([0.5, 0.5]);
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let path = Path::new("/nonexistent/heliocube.toml");
        assert!(matches!(Config::load(path), Err(Error::ConfigRead { .. })));
        assert_eq!(Config::load_or_default(path), Config::default());
    }

    #[test]
    fn test_format_time() {
        let time = Utc.with_ymd_and_hms(2011, 6, 7, 6, 33, 2).unwrap();
        assert_eq!(DisplayConfig::default().format_time(&time), "2011-06-07 06:33:02");

        let short = DisplayConfig::new("%d/%m").unwrap();
        assert_eq!(short.format_time(&time), "07/06");

        let broken = DisplayConfig {
            time_format: "%Q".to_string(),
        };
        assert_eq!(broken.format_time(&time), "2011-06-07T06:33:02+00:00");
    }
}
