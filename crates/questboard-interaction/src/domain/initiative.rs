//! Initiative rolling and turn-order construction.
//!
//! Turn order is a stable descending sort on the rolled value: entries with
//! equal rolls keep the order in which they were submitted. Ability scores
//! never break ties.

use std::collections::{HashMap, HashSet};

use questboard_core::error::DomainError;
use questboard_core::participant::{AbilityScores, EntityType, ParticipantRef};
use questboard_core::rng::{DeterministicRng, roll_die};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ranked participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    /// Participant identifier in the directory.
    pub entity_id: Uuid,
    /// Participant kind.
    pub entity_type: EntityType,
    /// d20 + dexterity modifier, or a GM override.
    pub initiative_roll: i32,
}

impl InitiativeEntry {
    /// Returns the participant this entry ranks.
    #[must_use]
    pub fn participant(&self) -> ParticipantRef {
        ParticipantRef {
            entity_id: self.entity_id,
            entity_type: self.entity_type,
        }
    }
}

/// How initiative should be produced for one roll request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitiativeRequest {
    /// Manually supplied entries, in submission order.
    pub rolls: Vec<InitiativeEntry>,
    /// Roll 1d20 + DEX modifier for every participant without a manual entry.
    pub auto_roll: bool,
    /// Replace an existing order, discarding pending actions.
    pub reroll: bool,
}

/// Sorts entries descending by roll, keeping submission order among ties.
#[must_use]
pub fn order_by_initiative(mut entries: Vec<InitiativeEntry>) -> Vec<InitiativeEntry> {
    // `sort_by` is stable.
    entries.sort_by(|a, b| b.initiative_roll.cmp(&a.initiative_roll));
    entries
}

/// Rolls `1d20 + floor((dexterity - 10) / 2)` for one participant.
#[allow(clippy::cast_possible_wrap)]
pub fn auto_roll(
    participant: ParticipantRef,
    scores: &AbilityScores,
    rng: &mut dyn DeterministicRng,
) -> InitiativeEntry {
    let natural = roll_die(rng, 20) as i32;
    InitiativeEntry {
        entity_id: participant.entity_id,
        entity_type: participant.entity_type,
        initiative_roll: natural + scores.initiative_modifier(),
    }
}

/// Builds the unsorted submission list for a roll request.
///
/// Manual mode keeps the caller's order and requires exactly one entry per
/// participant. Auto mode walks the participants in selection order, using a
/// manual entry where one exists and rolling otherwise; the RNG is consumed
/// in that same order.
///
/// # Errors
///
/// Returns `DomainError::Validation` for duplicate entries, entries that do
/// not reference a participant, or (manual mode) missing participants.
/// Returns `DomainError::NotFound` if auto mode lacks ability scores for a
/// participant.
pub fn assemble_rolls(
    participants: &[ParticipantRef],
    request: &InitiativeRequest,
    ability_scores: &HashMap<Uuid, AbilityScores>,
    rng: &mut dyn DeterministicRng,
) -> Result<Vec<InitiativeEntry>, DomainError> {
    let mut manual: HashMap<Uuid, InitiativeEntry> = HashMap::with_capacity(request.rolls.len());
    for entry in &request.rolls {
        if !participants.contains(&entry.participant()) {
            return Err(DomainError::Validation(format!(
                "initiative entry for {} {} is not a participant",
                entry.entity_type, entry.entity_id
            )));
        }
        if manual.insert(entry.entity_id, *entry).is_some() {
            return Err(DomainError::Validation(format!(
                "duplicate initiative entry for {}",
                entry.entity_id
            )));
        }
    }

    if !request.auto_roll {
        let covered: HashSet<Uuid> = manual.keys().copied().collect();
        if let Some(missing) = participants
            .iter()
            .find(|p| !covered.contains(&p.entity_id))
        {
            return Err(DomainError::Validation(format!(
                "missing initiative entry for {} {}",
                missing.entity_type, missing.entity_id
            )));
        }
        return Ok(request.rolls.clone());
    }

    participants
        .iter()
        .map(|participant| match manual.get(&participant.entity_id) {
            Some(entry) => Ok(*entry),
            None => {
                let scores = ability_scores
                    .get(&participant.entity_id)
                    .ok_or_else(|| DomainError::not_found("ability scores", participant.entity_id))?;
                Ok(auto_roll(*participant, scores, rng))
            }
        })
        .collect()
}
