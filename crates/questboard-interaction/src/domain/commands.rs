//! Commands for the Live Interaction context.

use questboard_core::command::Command;
use questboard_core::participant::ParticipantRef;
use uuid::Uuid;

use super::actions::{ActionDisposition, ActionType};
use super::initiative::InitiativeRequest;
use super::rewards::XpAward;

/// The GM's participant selection: three disjoint sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSelection {
    /// Selected player characters.
    pub player_character_ids: Vec<Uuid>,
    /// Selected NPCs.
    pub npc_ids: Vec<Uuid>,
    /// Selected monsters.
    pub monster_ids: Vec<Uuid>,
}

impl ParticipantSelection {
    /// Flattens the selection into participant references: player
    /// characters, then NPCs, then monsters, each in selection order.
    #[must_use]
    pub fn to_participants(&self) -> Vec<ParticipantRef> {
        self.player_character_ids
            .iter()
            .copied()
            .map(ParticipantRef::player_character)
            .chain(self.npc_ids.iter().copied().map(ParticipantRef::npc))
            .chain(self.monster_ids.iter().copied().map(ParticipantRef::monster))
            .collect()
    }
}

/// Command to create an interaction.
#[derive(Debug, Clone)]
pub struct CreateInteraction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new interaction's identifier.
    pub interaction_id: Uuid,
    /// The owning campaign.
    pub campaign_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Who takes part.
    pub participants: ParticipantSelection,
    /// Related location.
    pub related_location_id: Option<Uuid>,
    /// Related quest.
    pub related_quest_id: Option<Uuid>,
}

impl Command for CreateInteraction {
    fn command_type(&self) -> &'static str {
        "interaction.create"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to roll (or reroll) initiative.
#[derive(Debug, Clone)]
pub struct RollInitiative {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// Manual entries and roll mode.
    pub request: InitiativeRequest,
}

impl Command for RollInitiative {
    fn command_type(&self) -> &'static str {
        "interaction.roll_initiative"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to submit a player action.
#[derive(Debug, Clone)]
pub struct SubmitPlayerAction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
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
}

impl Command for SubmitPlayerAction {
    fn command_type(&self) -> &'static str {
        "interaction.submit_player_action"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to resolve or skip a pending action.
#[derive(Debug, Clone)]
pub struct ResolvePlayerAction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The action identifier.
    pub action_id: Uuid,
    /// The GM's verdict.
    pub disposition: ActionDisposition,
    /// GM notes.
    pub dm_notes: Option<String>,
}

impl Command for ResolvePlayerAction {
    fn command_type(&self) -> &'static str {
        "interaction.resolve_player_action"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to advance to the next turn.
#[derive(Debug, Clone)]
pub struct AdvanceTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The interaction identifier.
    pub interaction_id: Uuid,
}

impl Command for AdvanceTurn {
    fn command_type(&self) -> &'static str {
        "interaction.advance_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to complete an interaction and grant rewards.
#[derive(Debug, Clone)]
pub struct CompleteInteraction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The interaction identifier.
    pub interaction_id: Uuid,
    /// Items granted.
    pub reward_item_ids: Vec<Uuid>,
    /// Experience granted.
    pub xp_awards: Vec<XpAward>,
}

impl Command for CompleteInteraction {
    fn command_type(&self) -> &'static str {
        "interaction.complete"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
