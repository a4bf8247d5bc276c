//! Scan configuration.
//!
//! Loaded from a TOML file by front ends:
//!
//! ```toml
//! default_spec = "udl"
//! display_limit = 50
//! session_dir = "sessions"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::scan::OperandSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Operand spec used when a scan request names none
    pub default_spec: OperandSpec,
    /// Maximum number of addresses printed when listing a set
    pub display_limit: usize,
    /// Directory for saved candidate sets and snapshots
    pub session_dir: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_spec: OperandSpec::default(),
            display_limit: 50,
            session_dir: PathBuf::from("sessions"),
        }
    }
}

impl ScanConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Path of a named file inside the session directory
    pub fn session_path(&self, file_name: &str) -> PathBuf {
        self.session_dir.join(file_name)
    }
}

/// Builder for ScanConfig
#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    default_spec: Option<OperandSpec>,
    display_limit: Option<usize>,
    session_dir: Option<PathBuf>,
}

impl ScanConfigBuilder {
    pub fn default_spec(mut self, spec: OperandSpec) -> Self {
        self.default_spec = Some(spec);
        self
    }

    pub fn display_limit(mut self, limit: usize) -> Self {
        self.display_limit = Some(limit);
        self
    }

    pub fn session_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.session_dir = Some(path.into());
        self
    }

    pub fn build(self) -> ScanConfig {
        let default = ScanConfig::default();
        ScanConfig {
            default_spec: self.default_spec.unwrap_or(default.default_spec),
            display_limit: self.display_limit.unwrap_or(default.display_limit),
            session_dir: self.session_dir.unwrap_or(default.session_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_overrides() {
        let config = ScanConfig::builder()
            .default_spec("swb".parse().unwrap())
            .display_limit(10)
            .build();
        assert_eq!(config.default_spec.to_string(), "swb");
        assert_eq!(config.display_limit, 10);
        assert_eq!(config.session_dir, PathBuf::from("sessions"));
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "default_spec = \"udl\"\n").unwrap();

        let config = ScanConfig::load(file.path()).unwrap();
        assert_eq!(config.default_spec.to_string(), "udl");
        assert_eq!(config.display_limit, 50);
    }

    #[test]
    fn test_load_rejects_bad_spec() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "default_spec = \"ul\"\n").unwrap();
        assert!(matches!(ScanConfig::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ScanConfig::load("does-not-exist.toml").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let config = ScanConfig::builder().session_dir("scans").build();
        config.save(file.path()).unwrap();
        assert_eq!(ScanConfig::load(file.path()).unwrap(), config);
    }
}
