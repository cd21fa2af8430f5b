use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use secrecy::SecretString;

use crate::github::{GithubRepoName, WebhookSecret};
use crate::sizer::SizeTable;

/// Configuration of the service, loaded once at startup.
pub struct Config {
    /// Secret shared with GitHub, used to authenticate webhooks.
    pub webhook_secret: WebhookSecret,
    /// Repository (or owner) whose pull requests are sized.
    pub repository: RepositorySpec,
    /// Token used to authenticate against the GitHub API.
    pub github_token: SecretString,
    pub sizes: SizeTable,
}

/// Loads a size table from a TOML file.
pub fn load_size_table(path: &Path) -> anyhow::Result<SizeTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read size table from {}", path.display()))?;
    SizeTable::from_toml(&text)
        .with_context(|| format!("Invalid size table in {}", path.display()))
}

/// Selects the repositories whose events are processed: either all repositories of an owner,
/// or a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySpec {
    Owner(String),
    Repository(GithubRepoName),
}

impl RepositorySpec {
    pub fn matches(&self, repo: &GithubRepoName) -> bool {
        match self {
            RepositorySpec::Owner(owner) => repo.owner() == owner,
            RepositorySpec::Repository(name) => name == repo,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid repository {0:?}, expected `owner` or `owner/name`")]
pub struct RepositorySpecError(String);

impl FromStr for RepositorySpec {
    type Err = RepositorySpecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RepositorySpecError(value.to_string()));
        }
        if value.contains('/') {
            GithubRepoName::from_full_name(value)
                .map(RepositorySpec::Repository)
                .ok_or_else(|| RepositorySpecError(value.to_string()))
        } else {
            Ok(RepositorySpec::Owner(value.to_lowercase()))
        }
    }
}
