//! INI-like configuration: a single `[keybox]` table naming where the
//! vault file lives.

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "KEYBOX_CONFIG";
const VAULT_PATH_ENV: &str = "KEYBOX_PATH";
const CONFIG_FILE_NAME: &str = ".keybox.conf";
const DEFAULT_VAULT_FILE_NAME: &str = ".keybox.safe";

#[derive(Debug)]
pub enum ConfigError {
    HomeDirUnavailable,
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirUnavailable => {
                write!(f, "unable to determine the user's home directory")
            }
            ConfigError::Io(err) => write!(f, "filesystem error: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
            ConfigError::Serialize(err) => write!(f, "failed to serialize config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Serialize(err) => Some(err),
            ConfigError::HomeDirUnavailable => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    keybox: KeyboxSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyboxSection {
    #[serde(default)]
    path: Option<PathBuf>,
}

impl Default for KeyboxSection {
    fn default() -> Self {
        Self { path: None }
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home = home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
    Ok(home.join(CONFIG_FILE_NAME))
}

fn default_vault_path() -> Result<PathBuf, ConfigError> {
    let home = home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
    Ok(home.join(DEFAULT_VAULT_FILE_NAME))
}

fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(ConfigError::Parse),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

/// Resolve the vault path: `$KEYBOX_PATH` env var, then the `[keybox].path`
/// key in the config file, then `~/.keybox.safe`.
pub fn vault_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(VAULT_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let path = config_path()?;
    let config = load(&path)?;
    match config.keybox.path {
        Some(path) => Ok(path),
        None => default_vault_path(),
    }
}

/// Persist `path` as the configured vault location.
pub fn set_vault_path(path: &Path) -> Result<(), ConfigError> {
    let config_file = config_path()?;
    let config = FileConfig {
        keybox: KeyboxSection {
            path: Some(path.to_path_buf()),
        },
    };
    let toml = toml::to_string_pretty(&config).map_err(ConfigError::Serialize)?;
    fs::write(&config_file, toml).map_err(ConfigError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_yields_default() {
        let dir = tempdir().unwrap();
        let config = load(&dir.path().join("missing.conf")).unwrap();
        assert!(config.keybox.path.is_none());
    }

    #[test]
    fn parses_keybox_path_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.conf");
        fs::write(&path, "[keybox]\npath = \"/tmp/my.keybox\"\n").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.keybox.path, Some(PathBuf::from("/tmp/my.keybox")));
    }
}
