//! Reward Ledger: item and XP grants finalized at completion.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use questboard_core::error::DomainError;
use questboard_core::participant::{EntityType, ParticipantRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Experience granted to one player character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    /// Recipient.
    pub player_character_id: Uuid,
    /// Experience points, always positive.
    pub amount: u32,
}

/// The finalized rewards of a completed interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedger {
    /// Items handed out.
    pub reward_item_ids: Vec<Uuid>,
    /// Experience handed out.
    pub xp_awards: Vec<XpAward>,
    /// When the interaction was completed.
    pub completed_at: DateTime<Utc>,
}

/// Checks a reward grant against the interaction's participants.
///
/// # Errors
///
/// Returns `DomainError::Validation` if an item is listed twice, an XP
/// recipient is not a player-character participant or is listed twice, or an
/// amount is zero.
pub fn validate_rewards(
    participants: &[ParticipantRef],
    reward_item_ids: &[Uuid],
    xp_awards: &[XpAward],
) -> Result<(), DomainError> {
    let mut items = HashSet::with_capacity(reward_item_ids.len());
    for item_id in reward_item_ids {
        if !items.insert(item_id) {
            return Err(DomainError::Validation(format!(
                "reward item {item_id} listed more than once"
            )));
        }
    }

    let mut recipients = HashSet::with_capacity(xp_awards.len());
    for award in xp_awards {
        let recipient = ParticipantRef {
            entity_id: award.player_character_id,
            entity_type: EntityType::PlayerCharacter,
        };
        if !participants.contains(&recipient) {
            return Err(DomainError::Validation(format!(
                "xp recipient {} is not a player character in this interaction",
                award.player_character_id
            )));
        }
        if award.amount == 0 {
            return Err(DomainError::Validation(format!(
                "xp award for {} must be positive",
                award.player_character_id
            )));
        }
        if !recipients.insert(award.player_character_id) {
            return Err(DomainError::Validation(format!(
                "xp recipient {} listed more than once",
                award.player_character_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rewards_pass() {
        let pc = Uuid::new_v4();
        let participants = [ParticipantRef::player_character(pc)];
        let awards = [XpAward {
            player_character_id: pc,
            amount: 150,
        }];

        assert!(validate_rewards(&participants, &[Uuid::new_v4()], &awards).is_ok());
    }

    #[test]
    fn test_xp_for_monster_is_rejected() {
        let monster = Uuid::new_v4();
        let participants = [ParticipantRef::monster(monster)];
        let awards = [XpAward {
            player_character_id: monster,
            amount: 10,
        }];

        assert!(matches!(
            validate_rewards(&participants, &[], &awards),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_xp_is_rejected() {
        let pc = Uuid::new_v4();
        let participants = [ParticipantRef::player_character(pc)];
        let awards = [XpAward {
            player_character_id: pc,
            amount: 0,
        }];

        assert!(validate_rewards(&participants, &[], &awards).is_err());
    }

    #[test]
    fn test_duplicate_item_is_rejected() {
        let item = Uuid::new_v4();

        assert!(validate_rewards(&[], &[item, item], &[]).is_err());
    }

    #[test]
    fn test_duplicate_recipient_is_rejected() {
        let pc = Uuid::new_v4();
        let participants = [ParticipantRef::player_character(pc)];
        let award = XpAward {
            player_character_id: pc,
            amount: 5,
        };

        assert!(validate_rewards(&participants, &[], &[award, award]).is_err());
    }
}
