//! Query handlers for the Live Interaction context.
//!
//! Each query reconstitutes the interaction from its event stream and
//! returns a read-only view DTO.

use chrono::{DateTime, Utc};
use questboard_core::error::DomainError;
use questboard_core::participant::{CampaignParticipants, EntityType, ParticipantDirectory};
use questboard_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::actions::{ActionStatus, ActionType, PlayerAction};
use crate::domain::aggregates::{Interaction, InteractionStatus};
use crate::domain::initiative::InitiativeEntry;
use crate::domain::rewards::XpAward;

/// One slot of the turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitiativeEntryView {
    /// Participant identifier.
    pub entity_id: Uuid,
    /// Participant kind.
    pub entity_type: EntityType,
    /// The rolled or overridden value.
    pub initiative_roll: i32,
}

impl From<&InitiativeEntry> for InitiativeEntryView {
    fn from(entry: &InitiativeEntry) -> Self {
        Self {
            entity_id: entry.entity_id,
            entity_type: entry.entity_type,
            initiative_roll: entry.initiative_roll,
        }
    }
}

/// The turn order and pointer.
#[derive(Debug, Clone, Serialize)]
pub struct InitiativeOrderView {
    /// Entries, highest roll first.
    pub order: Vec<InitiativeEntryView>,
    /// Whose turn it is, as an index into `order`.
    pub current_index: Option<usize>,
    /// The entry at `current_index`.
    pub current_participant: Option<InitiativeEntryView>,
    /// 1-based round; 0 before initiative.
    pub round: u32,
}

/// Read-only view of a player action.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerActionView {
    /// Action identifier.
    pub action_id: Uuid,
    /// Owning interaction.
    pub interaction_id: Uuid,
    /// Submitter.
    pub player_character_id: Uuid,
    /// Kind of action.
    pub action_type: ActionType,
    /// What the player attempts.
    pub action_description: String,
    /// Item used, if any.
    pub associated_item_id: Option<Uuid>,
    /// Lifecycle state.
    pub status: ActionStatus,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// GM notes.
    pub dm_notes: Option<String>,
    /// Resolution time.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<&PlayerAction> for PlayerActionView {
    fn from(action: &PlayerAction) -> Self {
        Self {
            action_id: action.id,
            interaction_id: action.interaction_id,
            player_character_id: action.player_character_id,
            action_type: action.action_type,
            action_description: action.action_description.clone(),
            associated_item_id: action.associated_item_id,
            status: action.status,
            submitted_at: action.submitted_at,
            dm_notes: action.dm_notes.clone(),
            resolved_at: action.resolved_at,
        }
    }
}

/// Rewards of an interaction; empty until it completes.
#[derive(Debug, Clone, Serialize)]
pub struct RewardsView {
    /// Items granted.
    pub reward_item_ids: Vec<Uuid>,
    /// Experience granted.
    pub xp_awards: Vec<XpAward>,
    /// Completion time, once completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Read-only view of an interaction aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionView {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// Owning campaign.
    pub campaign_id: Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Related location.
    pub related_location_id: Option<Uuid>,
    /// Related quest.
    pub related_quest_id: Option<Uuid>,
    /// Current status.
    pub status: InteractionStatus,
    /// Selected participants.
    pub participants: Vec<questboard_core::participant::ParticipantRef>,
    /// Turn order and pointer.
    pub initiative: InitiativeOrderView,
    /// Number of actions awaiting review.
    pub pending_actions: usize,
    /// Rewards, once completed.
    pub rewards: Option<RewardsView>,
    /// Current version (event count).
    pub version: i64,
}

async fn load_existing(
    interaction_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Interaction, DomainError> {
    let stored_events = repo.load_events(interaction_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::not_found("interaction", interaction_id));
    }
    command_handlers::reconstitute(interaction_id, &stored_events)
}

fn initiative_view(interaction: &Interaction) -> InitiativeOrderView {
    InitiativeOrderView {
        order: interaction
            .initiative_order()
            .iter()
            .map(InitiativeEntryView::from)
            .collect(),
        current_index: interaction.current_index(),
        current_participant: interaction
            .current_participant()
            .map(InitiativeEntryView::from),
        round: interaction.round(),
    }
}

fn rewards_view(interaction: &Interaction) -> Option<RewardsView> {
    interaction.rewards.as_ref().map(|ledger| RewardsView {
        reward_item_ids: ledger.reward_item_ids.clone(),
        xp_awards: ledger.xp_awards.clone(),
        completed_at: Some(ledger.completed_at),
    })
}

/// Retrieves an interaction by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_interaction_by_id(
    interaction_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<InteractionView, DomainError> {
    let interaction = load_existing(interaction_id, repo).await?;

    let campaign_id = interaction
        .campaign_id
        .ok_or_else(|| DomainError::not_found("interaction", interaction_id))?;

    Ok(InteractionView {
        interaction_id,
        campaign_id,
        name: interaction.name.clone(),
        description: interaction.description.clone(),
        related_location_id: interaction.related_location_id,
        related_quest_id: interaction.related_quest_id,
        status: interaction.status(),
        participants: interaction.participants().to_vec(),
        initiative: initiative_view(&interaction),
        pending_actions: interaction.pending_count(),
        rewards: rewards_view(&interaction),
        version: interaction.version,
    })
}

/// Retrieves the turn order, pointer and round.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the interaction does not exist.
pub async fn get_initiative_order(
    interaction_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<InitiativeOrderView, DomainError> {
    let interaction = load_existing(interaction_id, repo).await?;
    Ok(initiative_view(&interaction))
}

/// Retrieves the review queue, oldest submission first.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the interaction does not exist.
pub async fn get_pending_player_actions(
    interaction_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Vec<PlayerActionView>, DomainError> {
    let interaction = load_existing(interaction_id, repo).await?;
    Ok(interaction
        .pending_actions()
        .into_iter()
        .map(PlayerActionView::from)
        .collect())
}

/// Retrieves every action ever submitted, in submission order.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the interaction does not exist.
pub async fn get_player_actions(
    interaction_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Vec<PlayerActionView>, DomainError> {
    let interaction = load_existing(interaction_id, repo).await?;
    Ok(interaction
        .actions
        .iter()
        .map(PlayerActionView::from)
        .collect())
}

/// Retrieves the reward ledger. Empty until the interaction completes.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the interaction does not exist.
pub async fn get_rewards(
    interaction_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<RewardsView, DomainError> {
    let interaction = load_existing(interaction_id, repo).await?;
    Ok(rewards_view(&interaction).unwrap_or(RewardsView {
        reward_item_ids: Vec::new(),
        xp_awards: Vec::new(),
        completed_at: None,
    }))
}

/// Lists the selectable participants of a campaign.
///
/// # Errors
///
/// Returns whatever the directory returns, typically
/// `DomainError::NotFound` for an unknown campaign.
pub async fn get_campaign_participants(
    campaign_id: Uuid,
    directory: &dyn ParticipantDirectory,
) -> Result<CampaignParticipants, DomainError> {
    directory.get_campaign_participants(campaign_id).await
}
