//! Routes exposing the Participant Directory for participant selection.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use questboard_core::participant::CampaignParticipants;
use tracing::instrument;
use uuid::Uuid;

use questboard_interaction::application::query_handlers;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{campaign_id}/participants
#[instrument(skip(state))]
async fn get_campaign_participants(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignParticipants>, ApiError> {
    let participants =
        query_handlers::get_campaign_participants(campaign_id, &*state.directory).await?;
    Ok(Json(participants))
}

/// Returns the router for campaign lookups.
pub fn router() -> Router<AppState> {
    Router::new().route("/{campaign_id}/participants", get(get_campaign_participants))
}
