//! Command handlers for the Live Interaction context.
//!
//! Every handler follows the same transaction shape: acquire the
//! interaction's lock, load and reconstitute the aggregate, run the domain
//! method, append with optimistic concurrency, publish notifications, release
//! the lock. A failure at any step leaves the stored stream untouched.

use std::collections::HashMap;
use std::sync::Mutex;

use questboard_core::aggregate::AggregateRoot;
use questboard_core::clock::Clock;
use questboard_core::error::DomainError;
use questboard_core::event::{DomainEvent, EventMetadata};
use questboard_core::participant::ParticipantDirectory;
use questboard_core::repository::{EventRepository, StoredEvent};
use questboard_core::rng::DeterministicRng;
use questboard_notifier::SessionNotifier;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::locks::InteractionLocks;
use crate::application::notifications::{TurnSnapshot, publish_changes};
use crate::domain::actions::ActionSubmission;
use crate::domain::aggregates::{Interaction, InteractionDraft};
use crate::domain::commands::{
    AdvanceTurn, CompleteInteraction, CreateInteraction, ResolvePlayerAction, RollInitiative,
    SubmitPlayerAction,
};
use crate::domain::events::{
    InteractionEvent, InteractionEventKind, PLAYER_ACTION_SUBMITTED_EVENT_TYPE,
    SUBMITTED_ACTION_ID_POINTER,
};

fn to_stored_event(event: &InteractionEvent) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        aggregate_id: meta.aggregate_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        causation_id: meta.causation_id,
        occurred_at: meta.occurred_at,
    }
}

/// Reconstitutes an `Interaction` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    interaction_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Interaction, DomainError> {
    let mut interaction = Interaction::new(interaction_id);
    for stored in existing_events {
        let kind: InteractionEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = InteractionEvent {
            metadata: EventMetadata::from(stored),
            kind,
        };
        interaction.apply(&event);
    }
    Ok(interaction)
}

async fn load(repo: &dyn EventRepository, interaction_id: Uuid) -> Result<Interaction, DomainError> {
    let existing_events = repo.load_events(interaction_id).await?;
    reconstitute(interaction_id, &existing_events)
}

/// Appends the uncommitted events and folds them into the aggregate so that
/// its version matches the stored stream.
async fn commit(
    interaction: &mut Interaction,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = interaction
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();

    repo.append_events(interaction.id, interaction.version, &stored_events)
        .await?;

    let committed = interaction.uncommitted_events().to_vec();
    for event in &committed {
        interaction.apply(event);
    }
    interaction.clear_uncommitted_events();
    Ok(stored_events)
}

/// Handles the `CreateInteraction` command: checks the participant selection
/// against the campaign roster and persists the creation event.
///
/// Creation publishes no notification; nobody can be subscribed yet.
///
/// # Errors
///
/// Returns `DomainError` if the roster lookup, validation, or appending
/// fails.
pub async fn handle_create_interaction(
    command: &CreateInteraction,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    directory: &dyn ParticipantDirectory,
    locks: &InteractionLocks,
) -> Result<Vec<StoredEvent>, DomainError> {
    let _guard = locks.acquire(command.interaction_id).await;
    let mut interaction = load(repo, command.interaction_id).await?;
    let roster = directory
        .get_campaign_participants(command.campaign_id)
        .await?;

    interaction.create(
        InteractionDraft {
            campaign_id: command.campaign_id,
            name: command.name.clone(),
            description: command.description.clone(),
            participants: command.participants.to_participants(),
            related_location_id: command.related_location_id,
            related_quest_id: command.related_quest_id,
        },
        &roster,
        command.correlation_id,
        clock,
    )?;

    let stored_events = commit(&mut interaction, repo).await?;
    info!(
        interaction_id = %command.interaction_id,
        campaign_id = %command.campaign_id,
        correlation_id = %command.correlation_id,
        participants = interaction.participants().len(),
        "interaction created"
    );
    Ok(stored_events)
}

/// Handles the `RollInitiative` command: fetches ability scores for every
/// participant that needs an auto-roll, rolls, and persists the new order.
///
/// The `Mutex` is locked only around the synchronous domain method call to
/// avoid holding a `MutexGuard` across await points.
///
/// # Errors
///
/// Returns `DomainError` if event loading, a directory lookup, validation,
/// or appending fails.
pub async fn handle_roll_initiative(
    command: &RollInitiative,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn EventRepository,
    directory: &dyn ParticipantDirectory,
    locks: &InteractionLocks,
    notifier: &dyn SessionNotifier,
) -> Result<Vec<StoredEvent>, DomainError> {
    let _guard = locks.acquire(command.interaction_id).await;
    let mut interaction = load(repo, command.interaction_id).await?;
    let before = TurnSnapshot::capture(&interaction);
    let discarded = interaction.pending_count();

    let mut ability_scores = HashMap::new();
    if command.request.auto_roll {
        for participant in interaction.participants() {
            let manual = command
                .request
                .rolls
                .iter()
                .any(|entry| entry.entity_id == participant.entity_id);
            if manual {
                continue;
            }
            let scores = directory
                .get_ability_scores(participant.entity_id, participant.entity_type)
                .await?;
            ability_scores.insert(participant.entity_id, scores);
        }
    }

    // Lock RNG only for the synchronous domain method, never across an await.
    {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        interaction.roll_initiative(
            &command.request,
            &ability_scores,
            &mut *rng_guard,
            command.correlation_id,
            clock,
        )?;
    }

    let stored_events = commit(&mut interaction, repo).await?;
    if command.request.reroll && discarded > 0 {
        warn!(
            interaction_id = %command.interaction_id,
            discarded,
            "initiative reroll discarded pending actions"
        );
    }
    info!(
        interaction_id = %command.interaction_id,
        correlation_id = %command.correlation_id,
        auto_roll = command.request.auto_roll,
        reroll = command.request.reroll,
        "initiative rolled"
    );

    publish_changes(notifier, &interaction, &before, true, clock.now());
    Ok(stored_events)
}

/// Handles the `SubmitPlayerAction` command: queues the action for GM review
/// after checking item ownership with the participant directory.
///
/// # Errors
///
/// Returns `DomainError` if event loading, validation, the ownership lookup,
/// or appending fails.
pub async fn handle_submit_player_action(
    command: &SubmitPlayerAction,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    directory: &dyn ParticipantDirectory,
    locks: &InteractionLocks,
    notifier: &dyn SessionNotifier,
) -> Result<Vec<StoredEvent>, DomainError> {
    let _guard = locks.acquire(command.interaction_id).await;
    let mut interaction = load(repo, command.interaction_id).await?;
    let before = TurnSnapshot::capture(&interaction);

    interaction.submit_player_action(
        ActionSubmission {
            action_id: command.action_id,
            player_character_id: command.player_character_id,
            action_type: command.action_type,
            action_description: command.action_description.clone(),
            associated_item_id: command.associated_item_id,
        },
        command.correlation_id,
        clock,
    )?;

    // An early return here drops the uncommitted event with the aggregate.
    if let Some(item_id) = command.associated_item_id {
        let owned = directory
            .character_owns_item(command.player_character_id, item_id)
            .await?;
        if !owned {
            return Err(DomainError::Validation(format!(
                "item {item_id} does not belong to player character {}",
                command.player_character_id
            )));
        }
    }

    let stored_events = commit(&mut interaction, repo).await?;
    let on_turn = interaction
        .current_participant()
        .is_some_and(|entry| entry.entity_id == command.player_character_id);
    info!(
        interaction_id = %command.interaction_id,
        action_id = %command.action_id,
        correlation_id = %command.correlation_id,
        on_turn,
        "player action submitted"
    );

    publish_changes(notifier, &interaction, &before, false, clock.now());
    Ok(stored_events)
}

/// Handles the `ResolvePlayerAction` command: locates the owning interaction
/// by action id, then resolves or skips the action.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown action, and `DomainError`
/// if event loading, validation, or appending fails.
pub async fn handle_resolve_player_action(
    command: &ResolvePlayerAction,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    locks: &InteractionLocks,
    notifier: &dyn SessionNotifier,
) -> Result<Vec<StoredEvent>, DomainError> {
    let interaction_id = repo
        .find_aggregate_by_payload(
            PLAYER_ACTION_SUBMITTED_EVENT_TYPE,
            SUBMITTED_ACTION_ID_POINTER,
            &serde_json::json!(command.action_id),
        )
        .await?
        .ok_or_else(|| DomainError::not_found("player action", command.action_id))?;
    debug!(action_id = %command.action_id, %interaction_id, "located action");

    let _guard = locks.acquire(interaction_id).await;
    let mut interaction = load(repo, interaction_id).await?;
    let before = TurnSnapshot::capture(&interaction);

    interaction.resolve_player_action(
        command.action_id,
        command.disposition,
        command.dm_notes.clone(),
        command.correlation_id,
        clock,
    )?;

    let stored_events = commit(&mut interaction, repo).await?;
    info!(
        %interaction_id,
        action_id = %command.action_id,
        correlation_id = %command.correlation_id,
        disposition = ?command.disposition,
        remaining = interaction.pending_count(),
        "player action resolved"
    );

    publish_changes(notifier, &interaction, &before, false, clock.now());
    Ok(stored_events)
}

/// Handles the `AdvanceTurn` command.
///
/// The pending-action check and the pointer move happen under the same lock,
/// so a concurrent submission is either seen (and blocks) or lands after the
/// advance.
///
/// # Errors
///
/// Returns `DomainError::TurnBlocked` while actions are pending, and
/// `DomainError` if event loading, validation, or appending fails.
pub async fn handle_advance_turn(
    command: &AdvanceTurn,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    locks: &InteractionLocks,
    notifier: &dyn SessionNotifier,
) -> Result<Vec<StoredEvent>, DomainError> {
    let _guard = locks.acquire(command.interaction_id).await;
    let mut interaction = load(repo, command.interaction_id).await?;
    let before = TurnSnapshot::capture(&interaction);

    if let Err(e) = interaction.advance_turn(command.correlation_id, clock) {
        if let DomainError::TurnBlocked { pending, .. } = &e {
            debug!(interaction_id = %command.interaction_id, pending, "turn advance blocked");
        }
        return Err(e);
    }

    let stored_events = commit(&mut interaction, repo).await?;
    info!(
        interaction_id = %command.interaction_id,
        correlation_id = %command.correlation_id,
        current_index = ?interaction.current_index(),
        round = interaction.round(),
        "turn advanced"
    );

    publish_changes(notifier, &interaction, &before, false, clock.now());
    Ok(stored_events)
}

/// Handles the `CompleteInteraction` command: finalizes the reward ledger
/// and closes the interaction.
///
/// # Errors
///
/// Returns `DomainError` if event loading, validation, or appending fails.
pub async fn handle_complete_interaction(
    command: &CompleteInteraction,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    locks: &InteractionLocks,
    notifier: &dyn SessionNotifier,
) -> Result<Vec<StoredEvent>, DomainError> {
    let _guard = locks.acquire(command.interaction_id).await;
    let mut interaction = load(repo, command.interaction_id).await?;
    let before = TurnSnapshot::capture(&interaction);

    interaction.complete(
        command.reward_item_ids.clone(),
        command.xp_awards.clone(),
        command.correlation_id,
        clock,
    )?;

    let stored_events = commit(&mut interaction, repo).await?;
    info!(
        interaction_id = %command.interaction_id,
        correlation_id = %command.correlation_id,
        reward_items = command.reward_item_ids.len(),
        xp_awards = command.xp_awards.len(),
        "interaction completed"
    );

    publish_changes(notifier, &interaction, &before, false, clock.now());
    Ok(stored_events)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use questboard_core::error::DomainError;
    use questboard_core::participant::{AbilityScores, EntityType, ParticipantRef};
    use questboard_core::repository::{EventRepository, StoredEvent};
    use questboard_core::rng::DeterministicRng;
    use questboard_notifier::NotificationType;
    use uuid::Uuid;

    use super::*;
    use crate::application::query_handlers::{get_initiative_order, get_pending_player_actions};
    use crate::domain::actions::{ActionDisposition, ActionType};
    use crate::domain::commands::ParticipantSelection;
    use crate::domain::events::{InteractionCreated, InteractionEventKind};
    use crate::domain::initiative::{InitiativeEntry, InitiativeRequest};
    use crate::domain::rewards::XpAward;
    use questboard_test_support::{
        EmptyEventRepository, FailingEventRepository, FixedClock, InMemoryEventRepository,
        InMemoryParticipantDirectory, MockRng, RecordingEventRepository, RecordingNotifier,
        SequenceRng,
    };

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn mock_rng() -> Mutex<MockRng> {
        Mutex::new(MockRng)
    }

    struct Table {
        campaign_id: Uuid,
        pc: Uuid,
        other_pc: Uuid,
        monster: Uuid,
        sword: Uuid,
        directory: InMemoryParticipantDirectory,
    }

    fn table() -> Table {
        let campaign_id = Uuid::new_v4();
        let (pc, other_pc, monster, sword) =
            (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let directory = InMemoryParticipantDirectory::builder()
            .player_character(campaign_id, pc, "Sera", AbilityScores { dexterity: 14, ..AbilityScores::default() })
            .player_character(campaign_id, other_pc, "Bram", AbilityScores::default())
            .monster(campaign_id, monster, "Goblin", AbilityScores::default())
            .item(pc, sword)
            .build();
        Table {
            campaign_id,
            pc,
            other_pc,
            monster,
            sword,
            directory,
        }
    }

    fn create_command(table: &Table, interaction_id: Uuid) -> CreateInteraction {
        CreateInteraction {
            correlation_id: Uuid::new_v4(),
            interaction_id,
            campaign_id: table.campaign_id,
            name: "Ambush at the ford".to_owned(),
            description: None,
            participants: ParticipantSelection {
                player_character_ids: vec![table.pc, table.other_pc],
                npc_ids: vec![],
                monster_ids: vec![table.monster],
            },
            related_location_id: None,
            related_quest_id: None,
        }
    }

    fn manual_roll(interaction_id: Uuid, rolls: &[(Uuid, EntityType, i32)], reroll: bool) -> RollInitiative {
        RollInitiative {
            correlation_id: Uuid::new_v4(),
            interaction_id,
            request: InitiativeRequest {
                rolls: rolls
                    .iter()
                    .map(|(entity_id, entity_type, initiative_roll)| InitiativeEntry {
                        entity_id: *entity_id,
                        entity_type: *entity_type,
                        initiative_roll: *initiative_roll,
                    })
                    .collect(),
                auto_roll: false,
                reroll,
            },
        }
    }

    fn submit_command(interaction_id: Uuid, pc: Uuid, item: Option<Uuid>) -> SubmitPlayerAction {
        SubmitPlayerAction {
            correlation_id: Uuid::new_v4(),
            interaction_id,
            action_id: Uuid::new_v4(),
            player_character_id: pc,
            action_type: ActionType::CombatAction,
            action_description: "I charge the goblin".to_owned(),
            associated_item_id: item,
        }
    }

    /// Creates an interaction and rolls pc=18, other_pc=12, monster=5.
    async fn started(table: &Table, repo: &InMemoryEventRepository, locks: &InteractionLocks) -> Uuid {
        let interaction_id = Uuid::new_v4();
        handle_create_interaction(&create_command(table, interaction_id), &fixed_clock(), repo, &table.directory, locks)
            .await
            .unwrap();
        let rng = mock_rng();
        handle_roll_initiative(
            &manual_roll(
                interaction_id,
                &[
                    (table.pc, EntityType::PlayerCharacter, 18),
                    (table.other_pc, EntityType::PlayerCharacter, 12),
                    (table.monster, EntityType::Monster, 5),
                ],
                false,
            ),
            &fixed_clock(),
            &rng,
            repo,
            &table.directory,
            locks,
            &RecordingNotifier::new(),
        )
        .await
        .unwrap();
        interaction_id
    }

    #[tokio::test]
    async fn test_handle_create_interaction_persists_event() {
        let table = table();
        let interaction_id = Uuid::new_v4();
        let command = create_command(&table, interaction_id);
        let repo = RecordingEventRepository::new(Ok(Vec::new()));

        let result = handle_create_interaction(&command, &fixed_clock(), &repo, &table.directory, &InteractionLocks::new()).await;
        assert!(result.is_ok());

        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);
        let (agg_id, expected_version, events) = &appended[0];
        assert_eq!(*agg_id, interaction_id);
        assert_eq!(*expected_version, 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "interaction.created");
        assert_eq!(events[0].sequence_number, 1);
        assert_eq!(events[0].correlation_id, command.correlation_id);
    }

    #[tokio::test]
    async fn test_handle_create_interaction_with_unknown_campaign_returns_not_found() {
        let table = table();
        let mut command = create_command(&table, Uuid::new_v4());
        command.campaign_id = Uuid::new_v4();

        let result = handle_create_interaction(
            &command,
            &fixed_clock(),
            &EmptyEventRepository,
            &table.directory,
            &InteractionLocks::new(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_handle_roll_initiative_auto_rolls_from_directory_scores() {
        let table = table();
        let interaction_id = Uuid::new_v4();
        let existing = vec![StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: interaction_id,
            event_type: "interaction.created".to_owned(),
            payload: serde_json::to_value(InteractionEventKind::InteractionCreated(InteractionCreated {
                interaction_id,
                campaign_id: table.campaign_id,
                name: "Ford".to_owned(),
                description: None,
                participants: vec![
                    ParticipantRef::player_character(table.pc),
                    ParticipantRef::monster(table.monster),
                ],
                related_location_id: None,
                related_quest_id: None,
            }))
            .unwrap(),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: fixed_clock().0,
        }];
        let repo = RecordingEventRepository::new(Ok(existing));
        // d20 for the PC, then for the monster.
        let rng: Mutex<SequenceRng> = Mutex::new(SequenceRng::new(vec![1, 15]));
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;
        let notifier = RecordingNotifier::new();
        let command = RollInitiative {
            correlation_id: Uuid::new_v4(),
            interaction_id,
            request: InitiativeRequest {
                auto_roll: true,
                ..InitiativeRequest::default()
            },
        };

        handle_roll_initiative(&command, &fixed_clock(), rng_ref, &repo, &table.directory, &InteractionLocks::new(), &notifier)
            .await
            .unwrap();

        let appended = repo.appended_events();
        let stored = &appended[0].2[0];
        assert_eq!(stored.event_type, "interaction.initiative_rolled");
        let order = &stored.payload["InitiativeRolled"]["order"];
        assert_eq!(order[0]["entity_id"], serde_json::json!(table.monster));
        assert_eq!(order[0]["initiative_roll"], 15);
        assert_eq!(order[1]["entity_id"], serde_json::json!(table.pc));
        assert_eq!(order[1]["initiative_roll"], 3);

        let types: Vec<NotificationType> = notifier.published().iter().map(|n| n.event_type).collect();
        assert_eq!(types, vec![NotificationType::TurnChanged, NotificationType::StatusChanged]);
        assert!(notifier.published().iter().all(|n| n.version == 2));
    }

    #[tokio::test]
    async fn test_handle_roll_initiative_on_missing_interaction_returns_not_found() {
        let table = table();
        let rng = mock_rng();

        let result = handle_roll_initiative(
            &manual_roll(Uuid::new_v4(), &[], false),
            &fixed_clock(),
            &rng,
            &EmptyEventRepository,
            &table.directory,
            &InteractionLocks::new(),
            &RecordingNotifier::new(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_handle_submit_rejects_item_owned_by_someone_else() {
        let table = table();
        let repo = InMemoryEventRepository::new();
        let locks = InteractionLocks::new();
        let interaction_id = started(&table, &repo, &locks).await;
        let notifier = RecordingNotifier::new();

        let result = handle_submit_player_action(
            &submit_command(interaction_id, table.other_pc, Some(table.sword)),
            &fixed_clock(),
            &repo,
            &table.directory,
            &locks,
            &notifier,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(get_pending_player_actions(interaction_id, &repo).await.unwrap().is_empty());
        assert!(notifier.published().is_empty());
    }

    #[tokio::test]
    async fn test_handle_submit_with_owned_item_publishes_queue_change() {
        let table = table();
        let repo = InMemoryEventRepository::new();
        let locks = InteractionLocks::new();
        let interaction_id = started(&table, &repo, &locks).await;
        let notifier = RecordingNotifier::new();

        handle_submit_player_action(
            &submit_command(interaction_id, table.pc, Some(table.sword)),
            &fixed_clock(),
            &repo,
            &table.directory,
            &locks,
            &notifier,
        )
        .await
        .unwrap();

        let published = notifier.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].event_type, NotificationType::ActionQueueChanged);
        assert_eq!(published[1].event_type, NotificationType::StatusChanged);
        assert_eq!(published[0].version, 3);
    }

    #[tokio::test]
    async fn test_handle_resolve_unknown_action_returns_not_found() {
        let command = ResolvePlayerAction {
            correlation_id: Uuid::new_v4(),
            action_id: Uuid::new_v4(),
            disposition: ActionDisposition::Resolved,
            dm_notes: None,
        };

        let result = handle_resolve_player_action(
            &command,
            &fixed_clock(),
            &InMemoryEventRepository::new(),
            &InteractionLocks::new(),
            &RecordingNotifier::new(),
        )
        .await;

        match result.unwrap_err() {
            DomainError::NotFound { entity, id } => {
                assert_eq!(entity, "player action");
                assert_eq!(id, command.action_id);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_review_then_advance_flow() {
        let table = table();
        let repo = InMemoryEventRepository::new();
        let locks = InteractionLocks::new();
        let notifier = RecordingNotifier::new();
        let interaction_id = started(&table, &repo, &locks).await;
        let submit = submit_command(interaction_id, table.pc, None);
        handle_submit_player_action(&submit, &fixed_clock(), &repo, &table.directory, &locks, &notifier)
            .await
            .unwrap();

        let blocked = handle_advance_turn(
            &AdvanceTurn {
                correlation_id: Uuid::new_v4(),
                interaction_id,
            },
            &fixed_clock(),
            &repo,
            &locks,
            &notifier,
        )
        .await;
        assert!(matches!(blocked, Err(DomainError::TurnBlocked { pending: 1, .. })));

        handle_resolve_player_action(
            &ResolvePlayerAction {
                correlation_id: Uuid::new_v4(),
                action_id: submit.action_id,
                disposition: ActionDisposition::Resolved,
                dm_notes: Some("Hit for 7".to_owned()),
            },
            &fixed_clock(),
            &repo,
            &locks,
            &notifier,
        )
        .await
        .unwrap();
        handle_advance_turn(
            &AdvanceTurn {
                correlation_id: Uuid::new_v4(),
                interaction_id,
            },
            &fixed_clock(),
            &repo,
            &locks,
            &notifier,
        )
        .await
        .unwrap();

        let order = get_initiative_order(interaction_id, &repo).await.unwrap();
        assert_eq!(order.current_index, Some(1));
        assert_eq!(order.round, 1);
        let last = notifier.published().pop().unwrap();
        assert_eq!(last.event_type, NotificationType::TurnChanged);
        assert_eq!(last.version, 5);
    }

    #[tokio::test]
    async fn test_reroll_discards_pending_and_notifies_queue_drop() {
        let table = table();
        let repo = InMemoryEventRepository::new();
        let locks = InteractionLocks::new();
        let notifier = RecordingNotifier::new();
        let interaction_id = started(&table, &repo, &locks).await;
        for pc in [table.pc, table.other_pc] {
            handle_submit_player_action(&submit_command(interaction_id, pc, None), &fixed_clock(), &repo, &table.directory, &locks, &notifier)
                .await
                .unwrap();
        }
        notifier.clear();
        let rng = mock_rng();

        handle_roll_initiative(
            &manual_roll(
                interaction_id,
                &[
                    (table.pc, EntityType::PlayerCharacter, 2),
                    (table.other_pc, EntityType::PlayerCharacter, 4),
                    (table.monster, EntityType::Monster, 20),
                ],
                true,
            ),
            &fixed_clock(),
            &rng,
            &repo,
            &table.directory,
            &locks,
            &notifier,
        )
        .await
        .unwrap();

        assert!(get_pending_player_actions(interaction_id, &repo).await.unwrap().is_empty());
        let types: Vec<NotificationType> = notifier.published().iter().map(|n| n.event_type).collect();
        assert_eq!(
            types,
            vec![
                NotificationType::TurnChanged,
                NotificationType::ActionQueueChanged,
                NotificationType::StatusChanged,
            ]
        );
    }

    #[tokio::test]
    async fn test_handle_complete_interaction_records_rewards() {
        let table = table();
        let repo = InMemoryEventRepository::new();
        let locks = InteractionLocks::new();
        let notifier = RecordingNotifier::new();
        let interaction_id = started(&table, &repo, &locks).await;

        let stored = handle_complete_interaction(
            &CompleteInteraction {
                correlation_id: Uuid::new_v4(),
                interaction_id,
                reward_item_ids: vec![Uuid::new_v4()],
                xp_awards: vec![XpAward {
                    player_character_id: table.pc,
                    amount: 100,
                }],
            },
            &fixed_clock(),
            &repo,
            &locks,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(stored[0].event_type, "interaction.completed");
        let published = notifier.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_type, NotificationType::StatusChanged);
    }

    #[tokio::test]
    async fn test_handle_advance_with_failing_repo_returns_infrastructure() {
        let result = handle_advance_turn(
            &AdvanceTurn {
                correlation_id: Uuid::new_v4(),
                interaction_id: Uuid::new_v4(),
            },
            &fixed_clock(),
            &FailingEventRepository,
            &InteractionLocks::new(),
            &RecordingNotifier::new(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_concurrent_submit_and_advance_never_skip_a_pending_action() {
        let table = Arc::new(table());
        let repo = Arc::new(InMemoryEventRepository::new());
        let locks = Arc::new(InteractionLocks::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let interaction_id = started(&table, &repo, &locks).await;

        let mut tasks = Vec::new();
        for i in 0..16 {
            let (table, repo, locks, notifier) = (
                Arc::clone(&table),
                Arc::clone(&repo),
                Arc::clone(&locks),
                Arc::clone(&notifier),
            );
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    handle_submit_player_action(
                        &submit_command(interaction_id, table.pc, None),
                        &fixed_clock(),
                        repo.as_ref(),
                        &table.directory,
                        &locks,
                        notifier.as_ref(),
                    )
                    .await
                    .map(|_| ())
                } else {
                    handle_advance_turn(
                        &AdvanceTurn {
                            correlation_id: Uuid::new_v4(),
                            interaction_id,
                        },
                        &fixed_clock(),
                        repo.as_ref(),
                        &locks,
                        notifier.as_ref(),
                    )
                    .await
                    .map(|_| ())
                }
            }));
        }

        let mut succeeded = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(DomainError::TurnBlocked { .. }) => {}
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }

        // Every submission landed and is still pending; no advance slipped
        // past one.
        let pending = get_pending_player_actions(interaction_id, repo.as_ref()).await.unwrap();
        assert_eq!(pending.len(), 8);
        let events = repo.load_events(interaction_id).await.unwrap();
        let sequence: Vec<i64> = events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, (1..=i64::try_from(events.len()).unwrap()).collect::<Vec<_>>());
        let first_submit = events
            .iter()
            .position(|e| e.event_type == "interaction.player_action_submitted")
            .unwrap();
        assert!(
            events[first_submit..]
                .iter()
                .all(|e| e.event_type != "interaction.turn_advanced")
        );
        assert!(succeeded >= 8);

        let versions: Vec<i64> = notifier.published().iter().map(|n| n.version).collect();
        assert!(versions.windows(2).all(|w| w[0] <= w[1]));
    }
}
