use crate::{Error, Result};
use agmeter_types::Source;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which agents get synced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub codex: bool,
    pub claude: bool,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        AgentsConfig {
            codex: true,
            claude: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agents: AgentsConfig,
    /// Database file override; defaults to `~/.agmeter/usage.db`.
    pub database: Option<String>,
    /// Sync before answering usage/stats queries.
    pub autosync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            agents: AgentsConfig::default(),
            database: None,
            autosync: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// A missing config file is not an error; everything has a default.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))?;
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) if !path.is_empty() => Ok(expand_tilde(path)),
            _ => Ok(data_dir()?.join("usage.db")),
        }
    }

    pub fn enabled_sources(&self) -> Vec<Source> {
        let mut sources = Vec::new();
        if self.agents.codex {
            sources.push(Source::Codex);
        }
        if self.agents.claude {
            sources.push(Source::Claude);
        }
        sources
    }

    pub fn is_enabled(&self, source: Source) -> bool {
        match source {
            Source::Codex => self.agents.codex,
            Source::Claude => self.agents.claude,
        }
    }
}

fn data_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".agmeter"))
        .ok_or_else(|| Error::Config("could not determine home directory".to_string()))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}
