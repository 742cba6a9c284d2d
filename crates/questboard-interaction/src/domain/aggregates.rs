//! Aggregate roots for the Live Interaction context.
//!
//! [`Interaction`] owns the initiative order, the turn pointer, every player
//! action submitted during the scene, and the reward ledger. Each domain
//! method validates against committed state and either records exactly one
//! event or returns an error without touching the aggregate.

use std::collections::{HashMap, HashSet};
use std::fmt;

use questboard_core::aggregate::AggregateRoot;
use questboard_core::clock::Clock;
use questboard_core::error::DomainError;
use questboard_core::event::EventMetadata;
use questboard_core::participant::{
    AbilityScores, CampaignParticipants, EntityType, ParticipantRef,
};
use questboard_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actions::{
    ActionDisposition, ActionStatus, ActionSubmission, PlayerAction, REROLL_DISCARD_NOTE,
};
use super::events::{
    INITIATIVE_ROLLED_EVENT_TYPE, INTERACTION_COMPLETED_EVENT_TYPE,
    INTERACTION_CREATED_EVENT_TYPE, InitiativeRolled, InteractionCompleted, InteractionCreated,
    InteractionEvent, InteractionEventKind, PLAYER_ACTION_RESOLVED_EVENT_TYPE,
    PLAYER_ACTION_SUBMITTED_EVENT_TYPE, PlayerActionResolved, PlayerActionSubmitted,
    TURN_ADVANCED_EVENT_TYPE, TurnAdvanced,
};
use super::initiative::{InitiativeEntry, InitiativeRequest, assemble_rolls, order_by_initiative};
use super::rewards::{RewardLedger, XpAward, validate_rewards};

/// Turn Tracker state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    /// Participants chosen, no initiative yet.
    Setup,
    /// Initiative rolled and nothing awaits review.
    AwaitingActions,
    /// At least one action awaits review.
    ActionsPending,
    /// Finished; terminal.
    Completed,
}

impl InteractionStatus {
    /// Returns the canonical snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::AwaitingActions => "awaiting_actions",
            Self::ActionsPending => "actions_pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to open an interaction.
#[derive(Debug, Clone)]
pub struct InteractionDraft {
    /// The owning campaign.
    pub campaign_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Player characters, then NPCs, then monsters.
    pub participants: Vec<ParticipantRef>,
    /// Related location.
    pub related_location_id: Option<Uuid>,
    /// Related quest.
    pub related_quest_id: Option<Uuid>,
}

/// The aggregate root for one live interaction.
#[derive(Debug)]
pub struct Interaction {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    /// Owning campaign; `None` until created.
    pub(crate) campaign_id: Option<Uuid>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) related_location_id: Option<Uuid>,
    pub(crate) related_quest_id: Option<Uuid>,
    /// Selected participants, fixed at creation.
    pub(crate) participants: Vec<ParticipantRef>,
    pub(crate) status: InteractionStatus,
    /// Sorted turn order; empty until rolled.
    pub(crate) initiative_order: Vec<InitiativeEntry>,
    /// Set exactly when the status indicates an active turn.
    pub(crate) current_index: Option<usize>,
    /// 1-based round; 0 until rolled.
    pub(crate) round: u32,
    /// Every submitted action, in submission order.
    pub(crate) actions: Vec<PlayerAction>,
    pub(crate) rewards: Option<RewardLedger>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<InteractionEvent>,
}

impl Interaction {
    /// Creates an empty aggregate, ready for reconstitution.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            campaign_id: None,
            name: String::new(),
            description: None,
            related_location_id: None,
            related_quest_id: None,
            participants: Vec::new(),
            status: InteractionStatus::Setup,
            initiative_order: Vec::new(),
            current_index: None,
            round: 0,
            actions: Vec::new(),
            rewards: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> InteractionStatus {
        self.status
    }

    /// Returns the current turn index, if a turn is active.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Returns the 1-based round, or 0 before initiative.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Returns the sorted turn order.
    #[must_use]
    pub fn initiative_order(&self) -> &[InitiativeEntry] {
        &self.initiative_order
    }

    /// Returns the participant whose turn it is.
    #[must_use]
    pub fn current_participant(&self) -> Option<&InitiativeEntry> {
        self.current_index
            .and_then(|index| self.initiative_order.get(index))
    }

    /// Returns the selected participants.
    #[must_use]
    pub fn participants(&self) -> &[ParticipantRef] {
        &self.participants
    }

    /// Returns the number of actions awaiting review.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_pending()).count()
    }

    /// Returns pending actions ordered by submission time, oldest first.
    #[must_use]
    pub fn pending_actions(&self) -> Vec<&PlayerAction> {
        let mut pending: Vec<&PlayerAction> =
            self.actions.iter().filter(|a| a.is_pending()).collect();
        // Stable: equal timestamps keep submission order.
        pending.sort_by_key(|a| a.submitted_at);
        pending
    }

    /// Returns an action by id.
    #[must_use]
    pub fn action(&self, action_id: Uuid) -> Option<&PlayerAction> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    /// Returns whether the interaction has been created.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.campaign_id.is_some()
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(
        &mut self,
        event_type: &str,
        kind: InteractionEventKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        let event = InteractionEvent {
            metadata: EventMetadata::new(
                self.id,
                event_type,
                self.next_sequence_number(),
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.uncommitted_events.push(event);
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if self.exists() {
            Ok(())
        } else {
            Err(DomainError::not_found("interaction", self.id))
        }
    }

    fn ensure_not_completed(&self) -> Result<(), DomainError> {
        if self.status == InteractionStatus::Completed {
            return Err(DomainError::InvalidState(format!(
                "interaction {} is completed",
                self.id
            )));
        }
        Ok(())
    }

    /// Opens the interaction, producing an `InteractionCreated` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the interaction already exists,
    /// `DomainError::Validation` for an empty name, an empty or duplicated
    /// participant selection, and `DomainError::NotFound` for a participant
    /// that is not part of the campaign roster.
    pub fn create(
        &mut self,
        draft: InteractionDraft,
        roster: &CampaignParticipants,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.exists() {
            return Err(DomainError::InvalidState(format!(
                "interaction {} already exists",
                self.id
            )));
        }

        let name = draft.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "interaction name must not be empty".to_owned(),
            ));
        }
        if draft.participants.is_empty() {
            return Err(DomainError::Validation(
                "an interaction needs at least one participant".to_owned(),
            ));
        }

        let mut seen = HashSet::with_capacity(draft.participants.len());
        for participant in &draft.participants {
            if !seen.insert(participant.entity_id) {
                return Err(DomainError::Validation(format!(
                    "participant {} selected more than once",
                    participant.entity_id
                )));
            }
            if !roster.contains(participant) {
                return Err(DomainError::not_found(
                    participant_entity_name(participant.entity_type),
                    participant.entity_id,
                ));
            }
        }

        let description = draft
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        let kind = InteractionEventKind::InteractionCreated(InteractionCreated {
            interaction_id: self.id,
            campaign_id: draft.campaign_id,
            name: name.to_owned(),
            description,
            participants: draft.participants,
            related_location_id: draft.related_location_id,
            related_quest_id: draft.related_quest_id,
        });
        self.record(INTERACTION_CREATED_EVENT_TYPE, kind, correlation_id, clock);
        Ok(())
    }

    /// Rolls initiative, producing an `InitiativeRolled` event.
    ///
    /// A reroll replaces the whole order, resets the pointer to the first
    /// entry and round 1, and discards every pending action.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the interaction is completed or
    /// already has an order and `reroll` was not requested, and the errors of
    /// [`assemble_rolls`] for malformed roll input.
    pub fn roll_initiative(
        &mut self,
        request: &InitiativeRequest,
        ability_scores: &HashMap<Uuid, AbilityScores>,
        rng: &mut dyn DeterministicRng,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_created()?;
        self.ensure_not_completed()?;
        if !self.initiative_order.is_empty() && !request.reroll {
            return Err(DomainError::InvalidState(
                "initiative already rolled; request a reroll to replace it".to_owned(),
            ));
        }

        let submitted = assemble_rolls(&self.participants, request, ability_scores, rng)?;
        let order = order_by_initiative(submitted);
        let discarded_action_ids = self
            .actions
            .iter()
            .filter(|a| a.is_pending())
            .map(|a| a.id)
            .collect();

        let kind = InteractionEventKind::InitiativeRolled(InitiativeRolled {
            interaction_id: self.id,
            order,
            discarded_action_ids,
        });
        self.record(INITIATIVE_ROLLED_EVENT_TYPE, kind, correlation_id, clock);
        Ok(())
    }

    /// Queues a player action, producing a `PlayerActionSubmitted` event.
    ///
    /// Any player-character participant may submit, whether or not it is
    /// their turn; the GM judges out-of-turn actions at review time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty description or a reused
    /// action id, `DomainError::NotFound` if the submitter is not a player
    /// character in this interaction, and `DomainError::InvalidState` before
    /// initiative or after completion.
    pub fn submit_player_action(
        &mut self,
        submission: ActionSubmission,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_created()?;

        let description = submission.action_description.trim();
        if description.is_empty() {
            return Err(DomainError::Validation(
                "action description must not be empty".to_owned(),
            ));
        }
        let submitter = ParticipantRef::player_character(submission.player_character_id);
        if !self.participants.contains(&submitter) {
            return Err(DomainError::not_found(
                "player character",
                submission.player_character_id,
            ));
        }
        if self.action(submission.action_id).is_some() {
            return Err(DomainError::Validation(format!(
                "action {} was already submitted",
                submission.action_id
            )));
        }

        self.ensure_not_completed()?;
        if self.initiative_order.is_empty() {
            return Err(DomainError::InvalidState(
                "initiative has not been rolled".to_owned(),
            ));
        }

        let kind = InteractionEventKind::PlayerActionSubmitted(PlayerActionSubmitted {
            interaction_id: self.id,
            action_id: submission.action_id,
            player_character_id: submission.player_character_id,
            action_type: submission.action_type,
            action_description: description.to_owned(),
            associated_item_id: submission.associated_item_id,
            submitted_at: clock.now(),
        });
        self.record(PLAYER_ACTION_SUBMITTED_EVENT_TYPE, kind, correlation_id, clock);
        Ok(())
    }

    /// Resolves or skips a pending action, producing a
    /// `PlayerActionResolved` event. Does not advance the turn.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the action does not belong to this
    /// interaction and `DomainError::InvalidState` if it is already terminal.
    pub fn resolve_player_action(
        &mut self,
        action_id: Uuid,
        disposition: ActionDisposition,
        dm_notes: Option<String>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_created()?;
        let action = self
            .action(action_id)
            .ok_or_else(|| DomainError::not_found("player action", action_id))?;
        if action.status.is_terminal() {
            return Err(DomainError::InvalidState(format!(
                "player action {action_id} is already {}",
                action.status
            )));
        }

        let kind = InteractionEventKind::PlayerActionResolved(PlayerActionResolved {
            interaction_id: self.id,
            action_id,
            disposition,
            dm_notes: dm_notes
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
            resolved_at: clock.now(),
        });
        self.record(PLAYER_ACTION_RESOLVED_EVENT_TYPE, kind, correlation_id, clock);
        Ok(())
    }

    /// Moves the turn pointer to the next participant, producing a
    /// `TurnAdvanced` event. Wraps to the first entry and increments the
    /// round at the end of the order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TurnBlocked` while any action is pending, and
    /// `DomainError::InvalidState` before initiative or after completion.
    pub fn advance_turn(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_created()?;
        self.ensure_not_completed()?;
        let Some(previous_index) = self.current_index else {
            return Err(DomainError::InvalidState(
                "initiative has not been rolled".to_owned(),
            ));
        };

        let pending = self.pending_count();
        if pending > 0 {
            return Err(DomainError::TurnBlocked {
                interaction_id: self.id,
                pending,
            });
        }

        let next = previous_index + 1;
        let (current_index, round) = if next >= self.initiative_order.len() {
            (0, self.round + 1)
        } else {
            (next, self.round)
        };

        let kind = InteractionEventKind::TurnAdvanced(TurnAdvanced {
            interaction_id: self.id,
            previous_index,
            current_index,
            round,
        });
        self.record(TURN_ADVANCED_EVENT_TYPE, kind, correlation_id, clock);
        Ok(())
    }

    /// Ends the interaction and finalizes the reward ledger, producing an
    /// `InteractionCompleted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if already completed or actions
    /// are still pending, and `DomainError::Validation` for malformed
    /// rewards.
    pub fn complete(
        &mut self,
        reward_item_ids: Vec<Uuid>,
        xp_awards: Vec<XpAward>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_created()?;
        self.ensure_not_completed()?;
        let pending = self.pending_count();
        if pending > 0 {
            return Err(DomainError::InvalidState(format!(
                "{pending} action(s) still await review"
            )));
        }
        validate_rewards(&self.participants, &reward_item_ids, &xp_awards)?;

        let kind = InteractionEventKind::InteractionCompleted(InteractionCompleted {
            interaction_id: self.id,
            reward_item_ids,
            xp_awards,
            completed_at: clock.now(),
        });
        self.record(INTERACTION_COMPLETED_EVENT_TYPE, kind, correlation_id, clock);
        Ok(())
    }

    /// Recomputes the status from the order and the review queue.
    fn refresh_status(&mut self) {
        if self.status == InteractionStatus::Completed {
            return;
        }
        self.status = if self.initiative_order.is_empty() {
            InteractionStatus::Setup
        } else if self.actions.iter().any(PlayerAction::is_pending) {
            InteractionStatus::ActionsPending
        } else {
            InteractionStatus::AwaitingActions
        };
    }
}

fn participant_entity_name(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::PlayerCharacter => "player character",
        EntityType::Npc => "npc",
        EntityType::Monster => "monster",
    }
}

impl AggregateRoot for Interaction {
    type Event = InteractionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            InteractionEventKind::InteractionCreated(payload) => {
                self.campaign_id = Some(payload.campaign_id);
                self.name.clone_from(&payload.name);
                self.description.clone_from(&payload.description);
                self.related_location_id = payload.related_location_id;
                self.related_quest_id = payload.related_quest_id;
                self.participants.clone_from(&payload.participants);
                self.status = InteractionStatus::Setup;
            }
            InteractionEventKind::InitiativeRolled(payload) => {
                for action in &mut self.actions {
                    if payload.discarded_action_ids.contains(&action.id) {
                        action.status = ActionStatus::Skipped;
                        action.dm_notes = Some(REROLL_DISCARD_NOTE.to_owned());
                        action.resolved_at = Some(event.metadata.occurred_at);
                    }
                }
                self.initiative_order.clone_from(&payload.order);
                self.current_index = if payload.order.is_empty() { None } else { Some(0) };
                self.round = 1;
            }
            InteractionEventKind::PlayerActionSubmitted(payload) => {
                self.actions.push(PlayerAction {
                    id: payload.action_id,
                    interaction_id: payload.interaction_id,
                    player_character_id: payload.player_character_id,
                    action_type: payload.action_type,
                    action_description: payload.action_description.clone(),
                    associated_item_id: payload.associated_item_id,
                    status: ActionStatus::Pending,
                    submitted_at: payload.submitted_at,
                    dm_notes: None,
                    resolved_at: None,
                });
            }
            InteractionEventKind::PlayerActionResolved(payload) => {
                if let Some(action) = self.actions.iter_mut().find(|a| a.id == payload.action_id) {
                    action.status = payload.disposition.into();
                    action.dm_notes.clone_from(&payload.dm_notes);
                    action.resolved_at = Some(payload.resolved_at);
                }
            }
            InteractionEventKind::TurnAdvanced(payload) => {
                self.current_index = Some(payload.current_index);
                self.round = payload.round;
            }
            InteractionEventKind::InteractionCompleted(payload) => {
                self.status = InteractionStatus::Completed;
                self.current_index = None;
                self.rewards = Some(RewardLedger {
                    reward_item_ids: payload.reward_item_ids.clone(),
                    xp_awards: payload.xp_awards.clone(),
                    completed_at: payload.completed_at,
                });
            }
        }
        self.refresh_status();
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
