//! Domain events for the Live Interaction context.

use chrono::{DateTime, Utc};
use questboard_core::event::{DomainEvent, EventMetadata};
use questboard_core::participant::ParticipantRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actions::{ActionDisposition, ActionType};
use super::initiative::InitiativeEntry;
use super::rewards::XpAward;

/// Emitted when the GM opens an interaction with a participant selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionCreated {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// The campaign the interaction belongs to.
    pub campaign_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional scene description.
    pub description: Option<String>,
    /// Selected participants: player characters, then NPCs, then monsters.
    pub participants: Vec<ParticipantRef>,
    /// Location the scene takes place in.
    pub related_location_id: Option<Uuid>,
    /// Quest the scene advances.
    pub related_quest_id: Option<Uuid>,
}

/// Emitted when initiative is rolled or rerolled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiativeRolled {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// The sorted turn order.
    pub order: Vec<InitiativeEntry>,
    /// Pending actions dropped by a reroll.
    pub discarded_action_ids: Vec<Uuid>,
}

/// Emitted when a player submits an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerActionSubmitted {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// The new action's identifier.
    pub action_id: Uuid,
    /// The submitting player character.
    pub player_character_id: Uuid,
    /// Kind of action.
    pub action_type: ActionType,
    /// Free-text description.
    pub action_description: String,
    /// Item used, if any.
    pub associated_item_id: Option<Uuid>,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

/// Emitted when the GM resolves or skips a pending action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerActionResolved {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// The action identifier.
    pub action_id: Uuid,
    /// The GM's verdict.
    pub disposition: ActionDisposition,
    /// GM notes.
    pub dm_notes: Option<String>,
    /// Resolution time.
    pub resolved_at: DateTime<Utc>,
}

/// Emitted when the turn pointer moves to the next participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnAdvanced {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// The index that was current before the advance.
    pub previous_index: usize,
    /// The new current index.
    pub current_index: usize,
    /// The round after the advance.
    pub round: u32,
}

/// Emitted when the GM ends the interaction and grants rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionCompleted {
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// Items granted.
    pub reward_item_ids: Vec<Uuid>,
    /// Experience granted.
    pub xp_awards: Vec<XpAward>,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

/// Event type identifier for [`InteractionCreated`].
pub const INTERACTION_CREATED_EVENT_TYPE: &str = "interaction.created";

/// Event type identifier for [`InitiativeRolled`].
pub const INITIATIVE_ROLLED_EVENT_TYPE: &str = "interaction.initiative_rolled";

/// Event type identifier for [`PlayerActionSubmitted`].
pub const PLAYER_ACTION_SUBMITTED_EVENT_TYPE: &str = "interaction.player_action_submitted";

/// Event type identifier for [`PlayerActionResolved`].
pub const PLAYER_ACTION_RESOLVED_EVENT_TYPE: &str = "interaction.player_action_resolved";

/// Event type identifier for [`TurnAdvanced`].
pub const TURN_ADVANCED_EVENT_TYPE: &str = "interaction.turn_advanced";

/// Event type identifier for [`InteractionCompleted`].
pub const INTERACTION_COMPLETED_EVENT_TYPE: &str = "interaction.completed";

/// JSON pointer to the action id inside a stored [`PlayerActionSubmitted`]
/// payload.
pub const SUBMITTED_ACTION_ID_POINTER: &str = "/PlayerActionSubmitted/action_id";

/// Event payload variants for the Live Interaction context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InteractionEventKind {
    /// The interaction has been created.
    InteractionCreated(InteractionCreated),
    /// Initiative has been rolled.
    InitiativeRolled(InitiativeRolled),
    /// A player action has been submitted.
    PlayerActionSubmitted(PlayerActionSubmitted),
    /// A player action has been resolved or skipped.
    PlayerActionResolved(PlayerActionResolved),
    /// The turn has advanced.
    TurnAdvanced(TurnAdvanced),
    /// The interaction has been completed.
    InteractionCompleted(InteractionCompleted),
}

/// Domain event envelope for the Live Interaction context.
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: InteractionEventKind,
}

impl DomainEvent for InteractionEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            InteractionEventKind::InteractionCreated(_) => INTERACTION_CREATED_EVENT_TYPE,
            InteractionEventKind::InitiativeRolled(_) => INITIATIVE_ROLLED_EVENT_TYPE,
            InteractionEventKind::PlayerActionSubmitted(_) => PLAYER_ACTION_SUBMITTED_EVENT_TYPE,
            InteractionEventKind::PlayerActionResolved(_) => PLAYER_ACTION_RESOLVED_EVENT_TYPE,
            InteractionEventKind::TurnAdvanced(_) => TURN_ADVANCED_EVENT_TYPE,
            InteractionEventKind::InteractionCompleted(_) => INTERACTION_COMPLETED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("InteractionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
