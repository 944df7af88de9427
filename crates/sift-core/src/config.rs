//! Scan and analysis configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// File-discovery policy for the directory walker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum file size in bytes; larger files are skipped.
    pub max_file_size: Option<u64>,
    pub follow_symlinks: Option<bool>,
    /// Walker thread count; 0 lets the walker pick.
    pub threads: usize,
    /// Extra ignore globs applied on top of the defaults.
    pub extra_ignore: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: None,
            follow_symlinks: None,
            threads: 0,
            extra_ignore: Vec::new(),
        }
    }
}

impl ScanConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(Self::DEFAULT_MAX_FILE_SIZE)
    }

    pub fn effective_threads(&self) -> usize {
        self.threads
    }

    /// 2 MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;
}

/// Analysis policy knobs consumed by the taint engine and its extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// In audit mode, checks also flag values they cannot prove safe
    /// (e.g. a password-validator property set from a non-constant).
    pub audit_mode: bool,
    /// Minimum accepted `RequiredLength` on a password validator.
    pub password_validator_required_length: i64,
    /// How many validator properties must be configured before the
    /// validator is considered strong enough.
    pub minimum_password_validator_properties: usize,
    /// Properties that must be set on every password validator.
    pub password_validator_required_properties: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            audit_mode: false,
            password_validator_required_length: 8,
            minimum_password_validator_properties: 0,
            password_validator_required_properties: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Load a config overlay from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_quiet() {
        let config = AnalyzerConfig::default();
        assert!(!config.audit_mode);
        assert_eq!(config.password_validator_required_length, 8);
        assert_eq!(config.minimum_password_validator_properties, 0);
        assert!(config.password_validator_required_properties.is_empty());
    }

    #[test]
    fn yaml_overlay() {
        let config = AnalyzerConfig::from_yaml(
            "audit_mode: true\n\
             minimum_password_validator_properties: 3\n\
             password_validator_required_properties: [RequiredLength, RequireDigit]\n",
        )
        .unwrap();
        assert!(config.audit_mode);
        assert_eq!(config.minimum_password_validator_properties, 3);
        assert_eq!(
            config.password_validator_required_properties,
            vec!["RequiredLength".to_string(), "RequireDigit".to_string()]
        );
        // untouched keys keep their defaults
        assert_eq!(config.password_validator_required_length, 8);
    }
}
