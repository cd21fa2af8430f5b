use std::fmt::{Display, Formatter};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::github::{GithubRepoName, PullRequestNumber};

/// The GitHub API call that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamCall {
    ListFiles { page: u32 },
    RemoveLabel { label: String },
    AddLabels { labels: Vec<String> },
}

impl Display for UpstreamCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamCall::ListFiles { page } => write!(f, "listing changed files (page {page})"),
            UpstreamCall::RemoveLabel { label } => write!(f, "removing label {label}"),
            UpstreamCall::AddLabels { labels } => write!(f, "adding label(s) {labels:?}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error("{call} on {repository}#{pr} returned {status}: {text}")]
    Status {
        repository: GithubRepoName,
        pr: PullRequestNumber,
        call: UpstreamCall,
        status: StatusCode,
        text: String,
    },
    #[error("{call} on {repository}#{pr} failed")]
    Request {
        repository: GithubRepoName,
        pr: PullRequestNumber,
        call: UpstreamCall,
        source: octocrab::Error,
    },
    #[error("{call} on {repository}#{pr} returned an invalid response: {reason}")]
    InvalidResponse {
        repository: GithubRepoName,
        pr: PullRequestNumber,
        call: UpstreamCall,
        reason: String,
    },
}

/// Terminal failure of a single webhook delivery.
#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("missing X-Hub-Signature header")]
    MissingSignature,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("webhook signature could not be verified")]
    AuthenticationFailure,
    #[error("repository is not configured")]
    NotConfigured,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl DeliveryError {
    pub fn status(&self) -> StatusCode {
        match self {
            DeliveryError::MissingSignature | DeliveryError::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            DeliveryError::AuthenticationFailure | DeliveryError::NotConfigured => {
                StatusCode::FORBIDDEN
            }
            DeliveryError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the webhook sender. It never contains internal details.
    fn public_message(&self) -> &'static str {
        match self {
            DeliveryError::MissingSignature => "Missing X-Hub-Signature",
            DeliveryError::MalformedRequest(_) => "Malformed body",
            DeliveryError::AuthenticationFailure => "Validating payload against signature failed",
            DeliveryError::NotConfigured => "Not configured for this repository",
            DeliveryError::Upstream(_) => "Error processing request",
        }
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "message": self.public_message() });
        (self.status(), Json(body)).into_response()
    }
}
