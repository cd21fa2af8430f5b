use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use secrecy::SecretString;

use crate::config::Config;
use crate::github::WebhookSecret;
use crate::sizer::{RepositoryClient, SizeTable, SizerContext};
use crate::{create_app, ServerState};


use client::TestRepositoryClient;
pub use webhook::{create_webhook_request, TEST_WEBHOOK_SECRET};

pub fn test_config(repository: &str) -> Config {
    Config {
        webhook_secret: WebhookSecret::new(TEST_WEBHOOK_SECRET.to_string()),
        repository: repository.parse().unwrap(),
        github_token: SecretString::new("test-token".to_string()),
        sizes: SizeTable::default(),
    }
}

/// Creates the webhook server for `acme/widget`, backed by the given client.
pub fn create_test_app(client: TestRepositoryClient) -> (Router, Arc<TestRepositoryClient>) {
    let client = Arc::new(client);
    let app = create_app_with_client(test_config("acme/widget"), client.clone());
    (app, client)
}

pub fn create_app_with_client(config: Config, client: Arc<dyn RepositoryClient>) -> Router {
    let ctx = SizerContext::new(Arc::new(config), client);
    create_app(ServerState::new(ctx))
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
