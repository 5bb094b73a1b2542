use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::ListOrder;
use db::Repositories;
use normalizer::{route_event, RouteOutcome};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::dto::{new_event, EventDto, EventsResponse, StatusResponse, WebhookResponse};
use crate::error::{ApiError, ApiResult};
use crate::metrics::{self, DeliveryOutcome};

/// Header carrying the delivery's event type.
const HEADER_EVENT: &str = "x-github-event";

#[derive(Clone)]
pub struct ApiState {
    pub repositories: Arc<dyn Repositories>,
    pub list_order: ListOrder,
    pub max_payload_bytes: usize,
    pub metrics_path: String,
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let metrics_path = state.metrics_path.clone();
    let body_limit = DefaultBodyLimit::max(state.max_payload_bytes);

    let webhook = Router::new()
        .route("/receiver", post(receive_webhook))
        .route("/events", get(list_events))
        .route("/health", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/webhook", webhook)
        .route(&metrics_path, get(export_metrics))
        .fallback(not_found)
        .layer(body_limit)
        .with_state(state)
}

#[instrument(skip(state, headers, body))]
async fn receive_webhook(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let event_type = headers
        .get(HEADER_EVENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    info!(event_type = %event_type, "received github event");

    let payload: Value = serde_json::from_slice(&body).map_err(|err| {
        warn!(
            event_type = %event_type,
            stage = "decode",
            error = %err,
            "webhook body is not JSON"
        );
        metrics::record_delivery(&event_type, DeliveryOutcome::Error);
        ApiError::Internal(format!("invalid JSON body: {err}"))
    })?;

    match route_event(&event_type, &payload) {
        RouteOutcome::Record(event) => {
            let event_id = state
                .repositories
                .events()
                .insert(new_event(event))
                .await
                .map_err(|err| {
                    error!(
                        event_type = %event_type,
                        stage = "insert",
                        error = %err,
                        "failed to store event"
                    );
                    metrics::record_delivery(&event_type, DeliveryOutcome::Error);
                    ApiError::from(err)
                })?;
            info!(event_type = %event_type, event_id = %event_id, "event saved");
            metrics::record_delivery(&event_type, DeliveryOutcome::Stored);
            Ok(Json(WebhookResponse::stored(event_id)))
        }
        RouteOutcome::Ignored(reason) => {
            info!(event_type = %event_type, reason = %reason, "no handler for event");
            metrics::record_delivery(&event_type, DeliveryOutcome::Ignored);
            Ok(Json(WebhookResponse::ignored(&event_type)))
        }
    }
}

#[instrument(skip(state))]
async fn list_events(State(state): State<Arc<ApiState>>) -> ApiResult<Json<EventsResponse>> {
    let rows = state
        .repositories
        .events()
        .list(state.list_order)
        .await
        .map_err(|err| {
            error!(stage = "list", error = %err, "failed to fetch events");
            ApiError::from(err)
        })?;
    let events = rows.into_iter().map(EventDto::from).collect();
    Ok(Json(EventsResponse::success(events)))
}

/// Liveness only; the store is not consulted.
async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::healthy())
}

#[instrument(skip(state))]
async fn ready(State(state): State<Arc<ApiState>>) -> ApiResult<Json<StatusResponse>> {
    state.repositories.ping().await.map_err(|err| {
        warn!(stage = "ping", error = %err, "event store unreachable");
        ApiError::Unavailable(err.to_string())
    })?;
    Ok(Json(StatusResponse::ready()))
}

async fn export_metrics() -> ApiResult<impl IntoResponse> {
    let (content_type, buffer) =
        metrics::render().map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], buffer))
}

async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}
