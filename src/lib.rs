//! This is the library of the sizebot webhook service.
pub mod config;
pub mod github;
pub mod sizer;
pub mod utils;

pub use config::{Config, RepositorySpec};
pub use github::api::create_github_client;
pub use github::server::{create_app, ServerState};
pub use github::WebhookSecret;
pub use sizer::{SizeTable, SizerContext};

#[cfg(test)]
mod tests;
