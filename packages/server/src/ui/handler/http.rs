//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};

use crate::{
    infrastructure::dto::http::{ErrorDto, PushRequest, PushResponse, StatsDto},
    ui::state::AppState,
};

/// Header carrying the shared push secret
pub const PUSH_SECRET_HEADER: &str = "x-push-secret";

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorDto {
            error: error.to_string(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Live connection and room counts
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    Json(StatsDto {
        active_connections: state.store.count_connections().await,
        active_rooms: state.store.count_rooms().await,
    })
}

/// `POST /internal/push`: the push API for an out-of-process CRUD service
pub async fn push_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<PushRequest>, JsonRejection>,
) -> Result<Json<PushResponse>, ApiError> {
    if let Some(secret) = &state.push_secret {
        let provided = headers
            .get(PUSH_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(secret.as_str()) {
            tracing::warn!("Push request with missing or wrong secret");
            return Err(api_error(StatusCode::UNAUTHORIZED, "invalid push secret"));
        }
    }

    let Json(request) = body.map_err(|rejection| {
        tracing::warn!("Malformed push request: {}", rejection.body_text());
        api_error(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    })?;

    let pusher = &state.pusher;
    let result = match request {
        PushRequest::NewMessage { payload } => {
            let conversation_id = payload.conversation_id.clone();
            pusher.emit_new_message(&conversation_id, payload).await
        }
        PushRequest::MessageRead { payload } => {
            let conversation_id = payload.conversation_id.clone();
            pusher.emit_message_read(&conversation_id, payload).await
        }
        PushRequest::MessageDeleted { payload } => {
            let conversation_id = payload.conversation_id.clone();
            pusher.emit_message_deleted(&conversation_id, payload).await
        }
        PushRequest::Typing { payload } => {
            let conversation_id = payload.conversation_id.clone();
            pusher.emit_typing(&conversation_id, payload).await
        }
        PushRequest::ConversationCreated {
            participant_ids,
            payload,
        } => {
            pusher
                .emit_conversation_created(&participant_ids, payload)
                .await
        }
        PushRequest::Notification { user_id, payload } => {
            pusher.emit_notification(&user_id, payload).await
        }
        PushRequest::ConversationUpdated {
            participant_ids,
            conversation_id,
            last_message_at,
        } => {
            pusher
                .emit_conversation_updated(&participant_ids, &conversation_id, last_message_at)
                .await
        }
    };

    let delivered = result.map_err(|e| {
        tracing::warn!("Refused push: {}", e);
        api_error(StatusCode::UNPROCESSABLE_ENTITY, e)
    })?;
    Ok(Json(PushResponse { delivered }))
}
