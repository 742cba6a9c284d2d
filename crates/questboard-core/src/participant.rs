//! Participant Directory contract.
//!
//! Player characters, NPCs and monsters are owned by the campaign's record
//! storage. The engine only reads them: to validate participant selection,
//! to derive initiative modifiers, and to check item ownership.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// The kind of entity taking part in an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A character controlled by a player.
    PlayerCharacter,
    /// A non-player character controlled by the GM.
    Npc,
    /// A monster controlled by the GM.
    Monster,
}

impl EntityType {
    /// Returns the canonical snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayerCharacter => "player_character",
            Self::Npc => "npc",
            Self::Monster => "monster",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weak reference to an entity in the Participant Directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantRef {
    /// The entity identifier in the directory.
    pub entity_id: Uuid,
    /// Which directory table the identifier belongs to.
    pub entity_type: EntityType,
}

impl ParticipantRef {
    /// Creates a reference to a player character.
    #[must_use]
    pub fn player_character(entity_id: Uuid) -> Self {
        Self {
            entity_id,
            entity_type: EntityType::PlayerCharacter,
        }
    }

    /// Creates a reference to an NPC.
    #[must_use]
    pub fn npc(entity_id: Uuid) -> Self {
        Self {
            entity_id,
            entity_type: EntityType::Npc,
        }
    }

    /// Creates a reference to a monster.
    #[must_use]
    pub fn monster(entity_id: Uuid) -> Self {
        Self {
            entity_id,
            entity_type: EntityType::Monster,
        }
    }
}

/// The six classic ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    /// Strength score.
    pub strength: i32,
    /// Dexterity score; drives the initiative modifier.
    pub dexterity: i32,
    /// Constitution score.
    pub constitution: i32,
    /// Intelligence score.
    pub intelligence: i32,
    /// Wisdom score.
    pub wisdom: i32,
    /// Charisma score.
    pub charisma: i32,
}

impl AbilityScores {
    /// Returns the dexterity modifier used for initiative.
    #[must_use]
    pub fn initiative_modifier(&self) -> i32 {
        ability_modifier(self.dexterity)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// `floor((score - 10) / 2)`, rounding toward negative infinity.
#[must_use]
pub fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}

/// Directory summary of one selectable participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    /// The entity identifier.
    pub entity_id: Uuid,
    /// Display name.
    pub name: String,
}

/// Everything a campaign offers for participant selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParticipants {
    /// Player characters in the campaign.
    pub player_characters: Vec<ParticipantSummary>,
    /// NPCs in the campaign.
    pub npcs: Vec<ParticipantSummary>,
    /// Monsters in the campaign.
    pub monsters: Vec<ParticipantSummary>,
}

impl CampaignParticipants {
    /// Returns whether `participant` is part of this campaign.
    #[must_use]
    pub fn contains(&self, participant: &ParticipantRef) -> bool {
        let list = match participant.entity_type {
            EntityType::PlayerCharacter => &self.player_characters,
            EntityType::Npc => &self.npcs,
            EntityType::Monster => &self.monsters,
        };
        list.iter().any(|p| p.entity_id == participant.entity_id)
    }
}

/// Read-only lookup of campaign participants.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Returns the ability scores of one entity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the entity does not exist.
    async fn get_ability_scores(
        &self,
        entity_id: Uuid,
        entity_type: EntityType,
    ) -> Result<AbilityScores, DomainError>;

    /// Returns the selectable participants of a campaign.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the campaign does not exist.
    async fn get_campaign_participants(
        &self,
        campaign_id: Uuid,
    ) -> Result<CampaignParticipants, DomainError>;

    /// Returns whether the player character carries the item.
    async fn character_owns_item(
        &self,
        player_character_id: Uuid,
        item_id: Uuid,
    ) -> Result<bool, DomainError>;
}
