//! Configuration for cronsweep

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Code search query that finds workflow files declaring cron triggers
pub const DEFAULT_SEARCH_QUERY: &str = "\"cron:\" path:.github/workflows language:YAML";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the corpus and derived artifacts are written to
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Code search query
    #[serde(default = "default_search_query")]
    pub search_query: String,

    /// Environment variable holding the API access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Clone depth for candidate repositories
    #[serde(default = "default_clone_depth")]
    pub clone_depth: u32,

    /// Seconds slept past a quota reset to avoid boundary races
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,

    /// Skip large-file (LFS) content during clones
    #[serde(default = "default_skip_lfs")]
    pub skip_lfs: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cronsweep")
}

fn default_search_query() -> String {
    DEFAULT_SEARCH_QUERY.to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_clone_depth() -> u32 {
    1
}

fn default_grace_secs() -> u64 {
    crate::ratelimit::DEFAULT_GRACE_SECS
}

fn default_skip_lfs() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            search_query: default_search_query(),
            token_env: default_token_env(),
            clone_depth: default_clone_depth(),
            grace_secs: default_grace_secs(),
            skip_lfs: default_skip_lfs(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("cronsweep").join("config.yml")),
            Some(PathBuf::from("cronsweep.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Read the API access token from the configured environment variable
    ///
    /// A missing token is fatal: nothing in the pipeline works without one.
    pub fn resolve_token(&self) -> Result<String> {
        std::env::var(&self.token_env).context(format!("{} environment variable not set", self.token_env))
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search_query, DEFAULT_SEARCH_QUERY);
        assert_eq!(config.token_env, "GITHUB_TOKEN");
        assert_eq!(config.clone_depth, 1);
        assert_eq!(config.grace_secs, 5);
        assert!(config.skip_lfs);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "data_dir: /tmp/census\nclone_depth: 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/census"));
        assert_eq!(config.clone_depth, 3);
        assert_eq!(config.search_query, DEFAULT_SEARCH_QUERY);
    }

    #[test]
    fn test_resolve_token_missing_is_an_error() {
        let mut config = Config::default();
        config.token_env = "CRONSWEEP_TEST_TOKEN_THAT_IS_NOT_SET".to_string();

        let err = config.resolve_token().unwrap_err();
        assert!(err.to_string().contains("CRONSWEEP_TEST_TOKEN_THAT_IS_NOT_SET"));
    }
}
