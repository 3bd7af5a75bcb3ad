//! Engine configuration, threaded explicitly into every check.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policies that change how the engine treats under-specified values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fail with a construction error when nothing can check a value's
    /// structure, instead of accepting it.
    pub strict: bool,
    /// Fail when a declared field is absent from an object, instead of
    /// skipping it.
    pub check_missing_attrs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: true,
            check_missing_attrs: false,
        }
    }
}

/// Errors raised while loading a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rttc config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Accept values with no checkable structure.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_check_missing_attrs(mut self, check: bool) -> Self {
        self.check_missing_attrs = check;
        self
    }

    /// Load from JSON text. Absent keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.strict);
        assert!(!config.check_missing_attrs);
        assert!(!Config::lenient().strict);
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{"check_missing_attrs": true}"#).unwrap();
        assert!(config.strict);
        assert!(config.check_missing_attrs);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Config::from_json("{strict: yes").unwrap_err();
        assert!(err.to_string().starts_with("invalid rttc config"));
    }

    #[test]
    fn test_from_json_rejects_unknown_key() {
        let err = Config::from_json(r#"{"stict": false}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `stict`"));
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::lenient().with_check_missing_attrs(true);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }
}
