use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const DEFAULT_NAMESPACE: &str = "default";

/// User-level configuration loaded from `~/.config/keysmith/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the file backend's root directory.
    pub data_dir: Option<PathBuf>,
    /// Store scope; records in different namespaces never see each other.
    pub namespace: Option<String>,
    /// Which backend holds the key records.
    #[serde(default)]
    pub backend: Backend,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON file per namespace under the data directory.
    #[default]
    File,
    /// OS keychain, one entry per key id.
    Keyring,
}

impl Config {
    pub fn namespace(&self) -> &str {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.trim().is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("keysmith").join("config.toml"))
}

/// Write the given config to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    let path = default_path()?;
    write_if_missing(config, &path)?;
    Ok(path)
}

/// Returns whether a file was written; an existing file is left untouched.
pub fn write_if_missing(config: &Config, path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_from_path(dir.path().join("config.toml")).expect("load");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.namespace(), "default");
        assert_eq!(cfg.backend, Backend::File);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "   \n").expect("write");

        assert_eq!(load_from_path(&path).expect("load"), Config::default());
    }

    #[test]
    fn parses_custom_config() {
        let contents = r#"
            data_dir = "/tmp/keysmith-data"
            namespace = "https://notes.example.org"
            backend = "keyring"
        "#;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write temp config");

        let cfg = load_from_path(&path).expect("load");
        assert_eq!(
            cfg,
            Config {
                data_dir: Some(PathBuf::from("/tmp/keysmith-data")),
                namespace: Some("https://notes.example.org".into()),
                backend: Backend::Keyring,
            }
        );
    }

    #[test]
    fn blank_namespace_falls_back_to_default() {
        let cfg = Config {
            namespace: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(cfg.namespace(), "default");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend = \"cloud\"").expect("write");

        assert!(load_from_path(&path).is_err());
    }

    #[test]
    fn write_creates_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            data_dir: Some(PathBuf::from("/tmp/keysmith-data")),
            namespace: Some("work".into()),
            backend: Backend::File,
        };

        assert!(write_if_missing(&cfg, &path).expect("write should succeed"));
        let other = Config::default();
        assert!(!write_if_missing(&other, &path).expect("second write ok"));

        let loaded = load_from_path(&path).expect("load");
        assert_eq!(loaded, cfg);
    }
}
