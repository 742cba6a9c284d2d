//! Player actions awaiting GM disposition.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of thing the player is attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Speaking to someone in the scene.
    Dialogue,
    /// An attack, spell, or other combat manoeuvre.
    CombatAction,
    /// An answer or manipulation for a puzzle.
    PuzzleInput,
    /// Anything else.
    Custom,
}

/// Lifecycle state of a [`PlayerAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Submitted, waiting in the GM's review queue.
    Pending,
    /// Adjudicated by the GM.
    Resolved,
    /// Passed over by the GM.
    Skipped,
}

impl ActionStatus {
    /// Returns the canonical snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Skipped => "skipped",
        }
    }

    /// Whether the action has left the review queue for good.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The GM's verdict on a pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionDisposition {
    /// The action happened; the GM narrates the outcome.
    Resolved,
    /// The action is dropped.
    Skipped,
}

impl From<ActionDisposition> for ActionStatus {
    fn from(disposition: ActionDisposition) -> Self {
        match disposition {
            ActionDisposition::Resolved => Self::Resolved,
            ActionDisposition::Skipped => Self::Skipped,
        }
    }
}

/// Note recorded on actions discarded by an initiative reroll.
pub const REROLL_DISCARD_NOTE: &str = "discarded by initiative reroll";

/// One submitted action. Retained as session history once terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Action identifier.
    pub id: Uuid,
    /// Owning interaction.
    pub interaction_id: Uuid,
    /// The submitting player character.
    pub player_character_id: Uuid,
    /// Kind of action.
    pub action_type: ActionType,
    /// Free-text description, never empty.
    pub action_description: String,
    /// Item the character uses, if any.
    pub associated_item_id: Option<Uuid>,
    /// Current lifecycle state.
    pub status: ActionStatus,
    /// When the player submitted it.
    pub submitted_at: DateTime<Utc>,
    /// GM notes attached at resolution.
    pub dm_notes: Option<String>,
    /// When the action left the queue.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PlayerAction {
    /// Whether the action still awaits review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ActionStatus::Pending
    }
}

/// A player's submission, before it is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSubmission {
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
