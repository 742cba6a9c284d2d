//! Routes for the Live Interaction context: setup, initiative, action
//! intake, turn advancement, and completion.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use questboard_interaction::application::command_handlers;
use questboard_interaction::application::query_handlers::{
    self, InitiativeOrderView, InteractionView, PlayerActionView, RewardsView,
};
use questboard_interaction::domain::actions::ActionType;
use questboard_interaction::domain::commands::{self, ParticipantSelection};
use questboard_interaction::domain::initiative::{InitiativeEntry, InitiativeRequest};
use questboard_interaction::domain::rewards::XpAward;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateInteractionRequest {
    /// The owning campaign.
    pub campaign_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Selected player characters.
    #[serde(default)]
    pub player_character_ids: Vec<Uuid>,
    /// Selected NPCs.
    #[serde(default)]
    pub npc_ids: Vec<Uuid>,
    /// Selected monsters.
    #[serde(default)]
    pub monster_ids: Vec<Uuid>,
    /// Related location.
    #[serde(default)]
    pub related_location_id: Option<Uuid>,
    /// Related quest.
    #[serde(default)]
    pub related_quest_id: Option<Uuid>,
}

/// Request body for POST /{interaction_id}/initiative.
#[derive(Debug, Default, Deserialize)]
pub struct RollInitiativeRequest {
    /// Manual entries, in submission order.
    #[serde(default)]
    pub rolls: Vec<InitiativeEntry>,
    /// Roll for every participant without a manual entry.
    #[serde(default)]
    pub auto_roll: bool,
    /// Replace an existing order.
    #[serde(default)]
    pub reroll: bool,
}

/// Request body for POST /{interaction_id}/actions.
#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    /// The submitting player character.
    pub player_character_id: Uuid,
    /// Kind of action.
    pub action_type: ActionType,
    /// What the character attempts.
    pub action_description: String,
    /// Item used, if any.
    #[serde(default)]
    pub associated_item_id: Option<Uuid>,
}

/// Response body for POST /{interaction_id}/actions.
#[derive(Debug, Serialize)]
pub struct SubmitActionResponse {
    /// The queued action.
    pub action_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// Request body for POST /{interaction_id}/complete.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteInteractionRequest {
    /// Items granted.
    #[serde(default)]
    pub reward_item_ids: Vec<Uuid>,
    /// Experience granted.
    #[serde(default)]
    pub xp_awards: Vec<XpAward>,
}

/// POST /
#[instrument(skip(state, request), fields(campaign_id = %request.campaign_id))]
async fn create_interaction(
    State(state): State<AppState>,
    Json(request): Json<CreateInteractionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CreateInteraction {
        correlation_id: Uuid::new_v4(),
        interaction_id: Uuid::new_v4(),
        campaign_id: request.campaign_id,
        name: request.name,
        description: request.description,
        participants: ParticipantSelection {
            player_character_ids: request.player_character_ids,
            npc_ids: request.npc_ids,
            monster_ids: request.monster_ids,
        },
        related_location_id: request.related_location_id,
        related_quest_id: request.related_quest_id,
    };

    info!(correlation_id = %command.correlation_id, "handling create_interaction command");

    let stored_events = command_handlers::handle_create_interaction(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        &*state.directory,
        &state.locks,
    )
    .await?;

    Ok(Json(CommandResponse::new(
        command.interaction_id,
        &stored_events,
    )))
}

/// GET /{interaction_id}
#[instrument(skip(state))]
async fn get_interaction(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Json<InteractionView>, ApiError> {
    let view =
        query_handlers::get_interaction_by_id(interaction_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{interaction_id}/initiative
#[instrument(skip(state, request), fields(auto_roll = request.auto_roll, reroll = request.reroll))]
async fn roll_initiative(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
    Json(request): Json<RollInitiativeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RollInitiative {
        correlation_id: Uuid::new_v4(),
        interaction_id,
        request: InitiativeRequest {
            rolls: request.rolls,
            auto_roll: request.auto_roll,
            reroll: request.reroll,
        },
    };

    info!(correlation_id = %command.correlation_id, "handling roll_initiative command");

    let stored_events = command_handlers::handle_roll_initiative(
        &command,
        state.clock.as_ref(),
        &state.rng,
        &*state.event_repository,
        &*state.directory,
        &state.locks,
        &*state.notifications,
    )
    .await?;

    Ok(Json(CommandResponse::new(interaction_id, &stored_events)))
}

/// GET /{interaction_id}/initiative
#[instrument(skip(state))]
async fn get_initiative_order(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Json<InitiativeOrderView>, ApiError> {
    let view =
        query_handlers::get_initiative_order(interaction_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{interaction_id}/actions
#[instrument(
    skip(state, request),
    fields(player_character_id = %request.player_character_id, action_type = ?request.action_type)
)]
async fn submit_action(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
    Json(request): Json<SubmitActionRequest>,
) -> Result<Json<SubmitActionResponse>, ApiError> {
    let command = commands::SubmitPlayerAction {
        correlation_id: Uuid::new_v4(),
        interaction_id,
        action_id: Uuid::new_v4(),
        player_character_id: request.player_character_id,
        action_type: request.action_type,
        action_description: request.action_description,
        associated_item_id: request.associated_item_id,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_player_action command");

    let stored_events = command_handlers::handle_submit_player_action(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        &*state.directory,
        &state.locks,
        &*state.notifications,
    )
    .await?;

    let event_ids = stored_events.iter().map(|e| e.event_id).collect();

    Ok(Json(SubmitActionResponse {
        action_id: command.action_id,
        event_ids,
    }))
}

/// GET /{interaction_id}/actions
#[instrument(skip(state))]
async fn get_player_actions(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Json<Vec<PlayerActionView>>, ApiError> {
    let actions =
        query_handlers::get_player_actions(interaction_id, &*state.event_repository).await?;
    Ok(Json(actions))
}

/// GET /{interaction_id}/actions/pending
#[instrument(skip(state))]
async fn get_pending_actions(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Json<Vec<PlayerActionView>>, ApiError> {
    let actions =
        query_handlers::get_pending_player_actions(interaction_id, &*state.event_repository)
            .await?;
    Ok(Json(actions))
}

/// POST /{interaction_id}/advance
#[instrument(skip(state))]
async fn advance_turn(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AdvanceTurn {
        correlation_id: Uuid::new_v4(),
        interaction_id,
    };

    info!(correlation_id = %command.correlation_id, "handling advance_turn command");

    let stored_events = command_handlers::handle_advance_turn(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        &state.locks,
        &*state.notifications,
    )
    .await?;

    Ok(Json(CommandResponse::new(interaction_id, &stored_events)))
}

/// POST /{interaction_id}/complete
#[instrument(skip(state, request), fields(reward_items = request.reward_item_ids.len()))]
async fn complete_interaction(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
    Json(request): Json<CompleteInteractionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CompleteInteraction {
        correlation_id: Uuid::new_v4(),
        interaction_id,
        reward_item_ids: request.reward_item_ids,
        xp_awards: request.xp_awards,
    };

    info!(correlation_id = %command.correlation_id, "handling complete_interaction command");

    let stored_events = command_handlers::handle_complete_interaction(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        &state.locks,
        &*state.notifications,
    )
    .await?;

    Ok(Json(CommandResponse::new(interaction_id, &stored_events)))
}

/// GET /{interaction_id}/rewards
#[instrument(skip(state))]
async fn get_rewards(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Json<RewardsView>, ApiError> {
    let rewards = query_handlers::get_rewards(interaction_id, &*state.event_repository).await?;
    Ok(Json(rewards))
}

/// Returns the router for the live interaction context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_interaction))
        .route("/{interaction_id}", get(get_interaction))
        .route(
            "/{interaction_id}/initiative",
            post(roll_initiative).get(get_initiative_order),
        )
        .route(
            "/{interaction_id}/actions",
            post(submit_action).get(get_player_actions),
        )
        .route("/{interaction_id}/actions/pending", get(get_pending_actions))
        .route("/{interaction_id}/advance", post(advance_turn))
        .route("/{interaction_id}/complete", post(complete_interaction))
        .route("/{interaction_id}/rewards", get(get_rewards))
}
