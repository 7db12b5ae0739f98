//! Scheduler configuration — TOML-backed settings for the clock and phase runner.

use cadence_core::{CadenceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the phase runner does when a component callback returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the frame and return the error from `run_frame`.
    #[default]
    Abort,
    /// Log the failure and continue with the next component in the scan.
    Isolate,
}

/// Settings for one scheduler instance.
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// fixed_timestep = 0.02
/// max_substeps = 8
/// max_frame_time = 0.25
/// max_instantiation_depth = 64
/// failure_policy = "isolate"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed timestep interval in seconds
    pub fixed_timestep: f64,
    /// Upper bound on FixedUpdate substeps in a single frame
    pub max_substeps: u32,
    /// Frame time clamp in seconds, avoids the spiral of death
    pub max_frame_time: f64,
    /// Deepest allowed chain of instantiations triggered from Awake/OnEnable
    pub max_instantiation_depth: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 50.0,
            max_substeps: 8,
            max_frame_time: 0.25,
            max_instantiation_depth: 64,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SchedulerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded scheduler config");
        Ok(config)
    }

    /// Reject values the clock or the runner cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(CadenceError::Configuration(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            return Err(CadenceError::Configuration(format!(
                "max_frame_time must be positive, got {}",
                self.max_frame_time
            )));
        }
        if self.max_substeps == 0 {
            return Err(CadenceError::Configuration(
                "max_substeps must be at least 1".into(),
            ));
        }
        if self.max_instantiation_depth == 0 {
            return Err(CadenceError::Configuration(
                "max_instantiation_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn parses_all_fields() {
        let config = SchedulerConfig::from_toml_str(
            r#"
            fixed_timestep = 0.01
            max_substeps = 3
            max_frame_time = 0.1
            max_instantiation_depth = 4
            failure_policy = "isolate"
            "#,
        )
        .unwrap();
        assert!((config.fixed_timestep - 0.01).abs() < 1e-12);
        assert_eq!(config.max_substeps, 3);
        assert_eq!(config.max_instantiation_depth, 4);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn rejects_non_positive_timestep() {
        let err = SchedulerConfig::from_toml_str("fixed_timestep = 0.0").unwrap_err();
        assert!(matches!(err, CadenceError::Configuration(_)));
    }

    #[test]
    fn rejects_zero_depth() {
        let err = SchedulerConfig::from_toml_str("max_instantiation_depth = 0").unwrap_err();
        assert!(matches!(err, CadenceError::Configuration(_)));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = SchedulerConfig::from_toml_str("failure_policy = \"retry\"").unwrap_err();
        assert!(matches!(err, CadenceError::TomlParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_substeps = 2").unwrap();
        let config = SchedulerConfig::load(file.path()).unwrap();
        assert_eq!(config.max_substeps, 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchedulerConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, CadenceError::IoError(_)));
    }
}
