//! Routes for the Action Review Queue.
//!
//! Actions are addressed by their own id; the owning interaction is looked
//! up from the event store.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use questboard_interaction::application::command_handlers;
use questboard_interaction::domain::actions::ActionDisposition;
use questboard_interaction::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{action_id}/resolve.
#[derive(Debug, Deserialize)]
pub struct ResolveActionRequest {
    /// `resolved` or `skipped`.
    pub status: ActionDisposition,
    /// Optional GM notes.
    #[serde(default)]
    pub dm_notes: Option<String>,
}

/// Response body for a resolved or skipped action.
#[derive(Debug, Serialize)]
pub struct ResolveActionResponse {
    /// The action that left the queue.
    pub action_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// POST /{action_id}/resolve
#[instrument(skip(state, request), fields(status = ?request.status))]
async fn resolve_action(
    State(state): State<AppState>,
    Path(action_id): Path<Uuid>,
    Json(request): Json<ResolveActionRequest>,
) -> Result<Json<ResolveActionResponse>, ApiError> {
    let command = commands::ResolvePlayerAction {
        correlation_id: Uuid::new_v4(),
        action_id,
        disposition: request.status,
        dm_notes: request.dm_notes,
    };

    info!(correlation_id = %command.correlation_id, "handling resolve_player_action command");

    let stored_events = command_handlers::handle_resolve_player_action(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        &state.locks,
        &*state.notifications,
    )
    .await?;

    let event_ids = stored_events.iter().map(|e| e.event_id).collect();

    Ok(Json(ResolveActionResponse {
        action_id,
        event_ids,
    }))
}

/// Returns the router for action review.
pub fn router() -> Router<AppState> {
    Router::new().route("/{action_id}/resolve", post(resolve_action))
}
