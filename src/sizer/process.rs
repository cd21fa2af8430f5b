use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::github::webhook::{parse_webhook_event, validate, EVENT_HEADER, SIGNATURE_HEADER};
use crate::github::DeliveryError;
use crate::sizer::{
    aggregate, reconcile, should_process, FilterDecision, PullRequestTarget, SizerContext,
    SkipReason,
};

#[derive(Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The event does not require the pull request to be resized.
    Skipped(SkipReason),
    /// The size labels of the pull request were reconciled.
    Labeled {
        target: PullRequestTarget,
        changes: u64,
        label: Option<String>,
    },
}

impl IntoResponse for DeliveryOutcome {
    fn into_response(self) -> Response {
        let body = match self {
            DeliveryOutcome::Skipped(SkipReason::UnsupportedEventType) => {
                serde_json::json!({ "message": "Skipping event type" })
            }
            DeliveryOutcome::Skipped(SkipReason::ActionNotRelevant) => {
                serde_json::json!({ "message": "Skipping action" })
            }
            DeliveryOutcome::Skipped(reason) => {
                serde_json::json!({ "message": format!("Skipping: {reason}") })
            }
            DeliveryOutcome::Labeled { label, .. } => {
                serde_json::json!({ "message": "Success", "label": label })
            }
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Processes a single webhook delivery from its raw headers and body.
///
/// The signature is verified before the body is looked at. No GitHub API call is made unless
/// the event passes the filter.
pub async fn deliver(
    ctx: &SizerContext,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<DeliveryOutcome, DeliveryError> {
    let config = &ctx.config;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .ok_or(DeliveryError::MissingSignature)?;
    validate(&config.webhook_secret, body, signature.as_bytes())
        .map_err(|_| DeliveryError::AuthenticationFailure)?;

    let event_type = headers
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok());
    let event = parse_webhook_event(event_type, body)
        .map_err(|error| DeliveryError::MalformedRequest(error.to_string()))?;

    let target = match should_process(&event, &config.repository) {
        FilterDecision::Proceed(target) => target,
        FilterDecision::Skip(SkipReason::RepositoryNotConfigured) => {
            tracing::warn!(
                "Received event for repository {:?}, which is not configured",
                event.repository().map(|repo| repo.to_string())
            );
            return Err(DeliveryError::NotConfigured);
        }
        FilterDecision::Skip(reason) => {
            tracing::debug!("Skipping {} event: {reason}", event.event_type());
            return Ok(DeliveryOutcome::Skipped(reason));
        }
    };

    let _guard = ctx.locks.lock(&target).await;
    let client = ctx.client.as_ref();

    let changes = aggregate(client, &target.repository, target.number).await?;
    let label = config.sizes.classify(changes);
    tracing::info!("{target} has {changes} changed line(s), size {label:?}");

    let label = reconcile(
        client,
        &target.repository,
        target.number,
        &config.sizes,
        label,
    )
    .await?;

    Ok(DeliveryOutcome::Labeled {
        target,
        changes,
        label,
    })
}
