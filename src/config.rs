use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, WatchError};

const LOCAL_CONFIG_FILE: &str = "pr-watcher.toml";

/// Owner login -> repository names. Owners iterate sorted, repositories in file order.
pub type RepoMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Keyring,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub credential_store: StoreKind,
    #[serde(default)]
    pub repos: RepoMap,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WatchError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| WatchError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| WatchError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (owner, repos) in &self.repos {
            if owner.trim().is_empty() {
                return Err(WatchError::Config("owner names must not be empty".into()));
            }
            if repos.iter().any(|r| r.trim().is_empty()) {
                return Err(WatchError::Config(format!(
                    "repository names for '{}' must not be empty",
                    owner
                )));
            }
        }
        Ok(())
    }

    /// Number of (owner, repository) pairs the aggregator will walk.
    pub fn pair_count(&self) -> usize {
        self.repos.values().map(Vec::len).sum()
    }
}

fn default_config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("pr-watcher").join("config.toml"))
}

/// Pick the config file: explicit path, then ./pr-watcher.toml, then the user config dir.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(local);
    }

    default_config_path()
        .ok_or_else(|| WatchError::Config("cannot determine the user config directory".into()))
}
