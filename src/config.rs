// src/config.rs

//! User configuration at ~/.config/stoollog/config.toml. Every key is optional.

use crate::calendar::WeekStart;
use crate::db;
use crate::error::{Result, StoolError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SLOT_KEY: &str = "stool-logs";
const DEFAULT_LIST_LIMIT: u32 = 20;

fn default_slot_key() -> String {
    DEFAULT_SLOT_KEY.to_string()
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Database file; defaults to ~/.config/stoollog/stoollog.db
    pub db_path: Option<PathBuf>,

    #[serde(default = "default_slot_key")]
    pub slot_key: String,

    #[serde(default)]
    pub week_start: WeekStart,

    /// How many entries `list --all` shows when `-n` is not given.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: None,
            slot_key: default_slot_key(),
            week_start: WeekStart::default(),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StoolError::HomeDirNotFound)?;
        Ok(home_dir.join(".config/stoollog/config.toml"))
    }

    /// Loads the default config file, falling back to defaults when it is absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
            .map_err(|e| StoolError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Resolves the database path; an explicit override wins over the config.
    pub fn db_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        match override_path.or(self.db_path.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => db::default_db_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.slot_key, "stool-logs");
        assert_eq!(config.week_start, WeekStart::Sunday);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "db_path = \"/tmp/logs.db\"\nweek_start = \"monday\"\nlist_limit = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config,
            Config {
                db_path: Some(PathBuf::from("/tmp/logs.db")),
                slot_key: "stool-logs".to_string(),
                week_start: WeekStart::Monday,
                list_limit: 5,
            }
        );
    }

    #[test]
    fn bad_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "week_start = \"friday\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(StoolError::Config(_))));
    }

    #[test]
    fn override_path_wins() {
        let config = Config {
            db_path: Some(PathBuf::from("/from/config.db")),
            ..Config::default()
        };
        assert_eq!(
            config.db_path(Some(Path::new("/from/flag.db"))).unwrap(),
            PathBuf::from("/from/flag.db")
        );
        assert_eq!(config.db_path(None).unwrap(), PathBuf::from("/from/config.db"));
    }
}
