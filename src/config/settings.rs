use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, GhostKeyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostKeyConfig {
    pub keygen: KeygenSettings,
    pub lifecycle: LifecycleSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygenSettings {
    /// Key generation tool, looked up on `PATH` when not absolute.
    pub program: PathBuf,
    pub rsa_bits: u32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    pub default_ttl_ms: u64,
    /// Where generated pairs go when no path is given. Defaults to the
    /// system temp dir.
    pub key_dir: Option<PathBuf>,
}

impl GhostKeyConfig {
    pub fn load() -> Result<Self, GhostKeyError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self, GhostKeyError> {
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path).map_err(|e| {
                ConfigError::FileError(format!("{}: {e}", config_path.display()))
            })?;
            toml::from_str(&content).map_err(|e| {
                ConfigError::FileError(format!("{}: {e}", config_path.display()))
            })?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keygen.rsa_bits < 1024 {
            return Err(ConfigError::Invalid(format!(
                "keygen.rsa_bits must be at least 1024, got {}",
                self.keygen.rsa_bits
            )));
        }
        if self.lifecycle.default_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "lifecycle.default_ttl_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "ghostkey", "GhostKey")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

impl LifecycleSettings {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn key_dir(&self) -> PathBuf {
        self.key_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GhostKeyConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, GhostKeyConfig::default());
        assert_eq!(config.keygen.program, PathBuf::from("ssh-keygen"));
        assert_eq!(config.lifecycle.default_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[keygen]\nrsa_bits = 3072\n\n[lifecycle]\nkey_dir = \"/run/ghostkey\"\n",
        )
        .unwrap();

        let config = GhostKeyConfig::load_from(&path).unwrap();
        assert_eq!(config.keygen.rsa_bits, 3072);
        assert_eq!(config.keygen.program, PathBuf::from("ssh-keygen"));
        assert_eq!(config.lifecycle.key_dir(), PathBuf::from("/run/ghostkey"));
        assert_eq!(config.lifecycle.default_ttl_ms, 30_000);
    }

    #[test]
    fn rejects_zero_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[lifecycle]\ndefault_ttl_ms = 0\n").unwrap();

        let err = GhostKeyConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, GhostKeyError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_weak_rsa() {
        let mut config = GhostKeyConfig::default();
        config.keygen.rsa_bits = 512;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_file_is_a_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[keygen\n").unwrap();

        let err = GhostKeyConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, GhostKeyError::Config(ConfigError::FileError(_))));
    }
}
