//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a complete
//! config. The CLI layers environment variables and flags on top.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Largest range the engine will ever expand.
pub const RANGE_SIZE_CEILING: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub cache_enabled: bool,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    /// Ranges with more members than this are dropped.
    pub max_range_size: usize,
    /// Characters scanned after a range or article for 準用.
    pub application_lookahead_chars: usize,
    /// References below this confidence are filtered out.
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_capacity: 1000,
            cache_ttl_secs: 3600,
            max_range_size: 100,
            application_lookahead_chars: 30,
            min_confidence: 0.0,
        }
    }
}

impl DetectorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache_capacity must be at least 1 when the cache is enabled".into(),
            ));
        }
        if !(1..=RANGE_SIZE_CEILING).contains(&self.max_range_size) {
            return Err(ConfigError::Invalid(format!(
                "max_range_size must be between 1 and {RANGE_SIZE_CEILING}, got {}",
                self.max_range_size
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must lie in [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_is_default() {
        let config = DetectorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DetectorConfig::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn partial_override() {
        let config =
            DetectorConfig::from_json_str(r#"{"cache_capacity": 5, "min_confidence": 0.6}"#).unwrap();
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.min_confidence, 0.6);
        assert_eq!(config.max_range_size, 100);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            DetectorConfig::from_json_str(r#"{"cache_capacity": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DetectorConfig::from_json_str(r#"{"max_range_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DetectorConfig::from_json_str(r#"{"min_confidence": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DetectorConfig::from_json_str("not json"),
            Err(ConfigError::Json(_))
        ));
        // A disabled cache may have zero capacity.
        assert!(DetectorConfig::from_json_str(r#"{"cache_enabled": false, "cache_capacity": 0}"#).is_ok());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_range_size": 20}}"#).unwrap();
        let config = DetectorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_range_size, 20);

        let missing = DetectorConfig::from_path(Path::new("/nonexistent/hourei.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
