//! INI file configuration adapter.
//!
//! Values are trimmed and a blank value reads as unset, so `period =` falls
//! back to the default exactly like a missing key. Numeric and boolean
//! getters log the values they cannot parse before using the default.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

/// Section and key names are case-insensitive.
#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
    source: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScreenerError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| ScreenerError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        tracing::debug!(file = %source, sections = config.sections().len(), "config loaded");
        Ok(Self { config, source })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self {
            config,
            source: "<string>".to_string(),
        })
    }

    /// Where the configuration was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn parsed_or<T: FromStr>(&self, section: &str, key: &str, default: T) -> T {
        let Some(raw) = self.get_string(section, key) else {
            return default;
        };
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(
                file = %self.source,
                section,
                key,
                value = %raw,
                "unparsable config value, using default"
            );
            default
        })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed_or(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed_or(section, key, default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        let Some(raw) = self.get_string(section, key) else {
            return default;
        };
        Self::parse_bool(&raw).unwrap_or_else(|| {
            tracing::warn!(
                file = %self.source,
                section,
                key,
                value = %raw,
                "not a boolean, using default"
            );
            default
        })
    }
}
