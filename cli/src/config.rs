//! CLI preferences

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const DEFAULT_CONFIG: &str = "config.json";

/// Per-user preferences kept in `~/.docflow/config.toml`
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    pub config: Option<String>,
    pub format: Option<String>,
}

impl Prefs {
    pub const KEYS: [&'static str; 2] = ["config", "format"];

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    /// Configuration file used when `--config` is not given
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(self.config.as_deref().unwrap_or(DEFAULT_CONFIG))
    }

    /// Saved output format, ignored when it no longer parses
    pub fn format(&self) -> Option<OutputFormat> {
        self.format.as_deref().and_then(|f| f.parse().ok())
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<&str>> {
        match key {
            "config" => Ok(self.config.as_deref()),
            "format" => Ok(self.format.as_deref()),
            _ => bail!("Unknown preference key: {}", key),
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        match key {
            "config" => self.config = Some(value),
            "format" => {
                value.parse::<OutputFormat>().map_err(anyhow::Error::msg)?;
                self.format = Some(value);
            }
            _ => bail!("Unknown preference key: {}", key),
        }
        Ok(())
    }

    fn path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(home.join(".docflow").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Prefs::default();
        assert_eq!(prefs.config_path(), PathBuf::from("config.json"));
        assert_eq!(prefs.format(), None);
    }

    #[test]
    fn test_set_get_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut prefs = Prefs::default();
        prefs.set("config", "/srv/forms/config.json".into()).unwrap();
        prefs.set("format", "yaml".into()).unwrap();
        assert!(prefs.set("format", "xml".into()).is_err());
        assert!(prefs.set("colour", "red".into()).is_err());
        prefs.save_to(&path).unwrap();

        let loaded = Prefs::load_from(&path).unwrap();
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.get("format").unwrap(), Some("yaml"));
        assert_eq!(loaded.format(), Some(OutputFormat::Yaml));
        assert_eq!(loaded.config_path(), PathBuf::from("/srv/forms/config.json"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Prefs::load_from(&dir.path().join("absent.toml")).unwrap(), Prefs::default());
    }
}
