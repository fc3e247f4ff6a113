//! Change Feed API Handler
//!
//! HTTP endpoint for the Status Store's change feed. The feed redelivers on
//! transport failure only, so this handler answers 200 for every well-formed
//! notification it managed to process, even when dispatch failed materially
//! (the record has been marked failed in that case). Database errors answer
//! 5xx so the feed retries.

use axum::{Json, extract::State};
use gantry_core::dto::event::EventNotification;
use serde::Serialize;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::event::{self, EventOutcome};

/// POST /event/deployment-created
/// Receive a document-created notification from the change feed
pub async fn deployment_created(
    State(state): State<AppState>,
    Json(notification): Json<EventNotification>,
) -> ApiResult<Json<EventResponse>> {
    tracing::debug!(
        "Change feed notification: type={} subject={}",
        notification.event_type,
        notification.subject
    );

    let outcome = event::handle_created_event(
        &state.pool,
        &state.job_runs,
        &state.builds,
        &notification,
    )
    .await?;

    let response = match outcome {
        EventOutcome::Ignored => EventResponse {
            outcome: "ignored",
            reference: None,
            error: None,
        },
        EventOutcome::Dispatched(reference) => EventResponse {
            outcome: "dispatched",
            reference: Some(reference),
            error: None,
        },
        EventOutcome::AlreadyHandled => EventResponse {
            outcome: "already-handled",
            reference: None,
            error: None,
        },
        EventOutcome::Failed(error) => EventResponse {
            outcome: "failed",
            reference: None,
            error: Some(error),
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
