use anyhow::Context;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};

pub mod client;

pub use client::GithubRepositoryClient;

pub fn base_github_url() -> &'static str {
    "https://api.github.com"
}

/// Creates a GitHub API client authenticated with the given bearer token.
///
/// Failed requests are not retried.
pub fn create_github_client(token: &SecretString, base_url: &str) -> anyhow::Result<Octocrab> {
    let mut builder = Octocrab::builder()
        .base_uri(base_url)
        .with_context(|| format!("Invalid GitHub API URL {base_url}"))?
        .personal_token(token.expose_secret().clone());
    builder.add_retry_config(RetryConfig::None);
    builder.build().context("Could not create octocrab client")
}
