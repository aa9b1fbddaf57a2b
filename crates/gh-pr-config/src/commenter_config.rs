//! Commenter configuration
//!
//! Configuration loaded from `.gh-pr-commenter.toml`.

use crate::config_file::load_config_file;
use crate::paths::config_search_paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

/// Commenter configuration loaded from `.gh-pr-commenter.toml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CommenterConfig {
    /// GitHub host, e.g. "github.com" or a GitHub Enterprise hostname
    #[serde(default = "default_host")]
    pub host: String,

    /// Repository owner (user or organization)
    #[serde(default)]
    pub owner: String,

    /// Repository name
    #[serde(default)]
    pub repo: String,

    /// Pull request number
    #[serde(default)]
    pub pr_number: u64,

    /// Backoff settings for comment creation
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Backoff settings for remote writes
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Attempt `i` waits `i * i` units before running
    #[serde(default = "default_backoff_unit_secs")]
    pub backoff_unit_secs: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_max_attempts() -> u32 {
    6
}

fn default_backoff_unit_secs() -> u64 {
    1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit_secs: default_backoff_unit_secs(),
        }
    }
}

impl RetryConfig {
    /// Backoff unit as a duration
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_secs(self.backoff_unit_secs)
    }
}

impl Default for CommenterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            owner: String::new(),
            repo: String::new(),
            pr_number: 0,
            retry: RetryConfig::default(),
        }
    }
}

impl CommenterConfig {
    /// Configuration for a specific pull request with default settings
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, pr_number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            pr_number,
            ..Self::default()
        }
    }

    /// Load config from CWD first, then the config directory, or use defaults
    ///
    /// A file that exists but does not parse is logged and ignored.
    pub fn load() -> Self {
        if let Some((path, content)) = load_config_file(&config_search_paths()) {
            match Self::parse(&content) {
                Ok(config) => {
                    log::info!("Loaded commenter config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {}: {:#}", path.display(), e);
                }
            }
        }

        log::debug!("Using default commenter config");
        Self::default()
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse TOML config content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Point the config at a pull request, overriding owner/repo/number
    pub fn with_target(
        mut self,
        owner: impl Into<String>,
        repo: impl Into<String>,
        pr_number: u64,
    ) -> Self {
        self.owner = owner.into();
        self.repo = repo.into();
        self.pr_number = pr_number;
        self
    }

    /// Fill owner/repo from an `owner/repo` slug, as in `GITHUB_REPOSITORY`
    pub fn with_repository_slug(mut self, slug: &str) -> Result<Self> {
        let (owner, repo) = slug
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .with_context(|| format!("Invalid repository slug '{}', expected owner/repo", slug))?;
        self.owner = owner.to_string();
        self.repo = repo.to_string();
        Ok(self)
    }

    /// Check that the pull request target is fully specified
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() || self.repo.is_empty() {
            anyhow::bail!("Repository owner and name must be set");
        }
        if self.pr_number == 0 {
            anyhow::bail!("Pull request number must be set");
        }
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        Ok(())
    }
}
