use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::github::webhook::EVENT_HEADER;
use crate::github::DeliveryError;
use crate::sizer::{deliver, SizerContext};
use crate::utils::logging::LogError;

/// Shared server state for all axum handlers.
pub struct ServerState {
    ctx: SizerContext,
}

impl ServerState {
    pub fn new(ctx: SizerContext) -> Self {
        Self { ctx }
    }
}

pub type ServerStateRef = Arc<ServerState>;

pub fn create_app(state: ServerState) -> Router {
    // Health checks are polled frequently, so they are kept out of the request log.
    let webhook = Router::new()
        .route("/webhook", post(github_webhook_handler))
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/healthz", get(health_handler))
        .merge(webhook)
        .layer(ConcurrencyLimitLayer::new(100))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(Arc::new(state))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Router panicked: {err:?}");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Axum handler that receives a webhook and runs it through the sizing pipeline.
pub async fn github_webhook_handler(
    State(state): State<ServerStateRef>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = tracing::info_span!(
        "delivery",
        event = ?headers.get(EVENT_HEADER),
        delivery = ?headers.get("x-github-delivery")
    );

    let result = async {
        let body = body.map_err(|error| DeliveryError::MalformedRequest(error.body_text()))?;
        deliver(&state.ctx, &headers, &body).await
    }
    .instrument(span.clone())
    .await;

    match result {
        Ok(outcome) => outcome.into_response(),
        Err(error) => {
            match &error {
                DeliveryError::Upstream(_) => span.log_error(&error),
                _ => span.in_scope(|| tracing::warn!("Rejecting webhook: {error}")),
            }
            error.into_response()
        }
    }
}
