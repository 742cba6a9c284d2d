//! Participant Directory adapters.
//!
//! The engine only reads from the directory. [`PgParticipantDirectory`]
//! queries the `campaigns`, `campaign_participants` and `character_items`
//! tables; [`InMemoryParticipantDirectory`] is seeded through its builder
//! or from a JSON [`DirectorySeed`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use questboard_core::error::DomainError;
use questboard_core::participant::{
    AbilityScores, CampaignParticipants, EntityType, ParticipantDirectory, ParticipantSummary,
};

fn entity_name(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::PlayerCharacter => "player character",
        EntityType::Npc => "npc",
        EntityType::Monster => "monster",
    }
}

fn parse_entity_type(raw: &str) -> Result<EntityType, DomainError> {
    match raw {
        "player_character" => Ok(EntityType::PlayerCharacter),
        "npc" => Ok(EntityType::Npc),
        "monster" => Ok(EntityType::Monster),
        other => Err(DomainError::Infrastructure(format!(
            "unknown entity type in directory: {other}"
        ))),
    }
}

// --- PostgreSQL ---

/// PostgreSQL-backed participant directory.
#[derive(Debug, Clone)]
pub struct PgParticipantDirectory {
    pool: PgPool,
}

impl PgParticipantDirectory {
    /// Creates a new `PgParticipantDirectory`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(e: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("participant directory: {e}"))
}

#[async_trait]
impl ParticipantDirectory for PgParticipantDirectory {
    async fn get_ability_scores(
        &self,
        entity_id: Uuid,
        entity_type: EntityType,
    ) -> Result<AbilityScores, DomainError> {
        let row: Option<(i32, i32, i32, i32, i32, i32)> = sqlx::query_as(
            "SELECT strength, dexterity, constitution, intelligence, wisdom, charisma \
             FROM campaign_participants WHERE entity_id = $1 AND entity_type = $2",
        )
        .bind(entity_id)
        .bind(entity_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        let (strength, dexterity, constitution, intelligence, wisdom, charisma) =
            row.ok_or_else(|| DomainError::not_found(entity_name(entity_type), entity_id))?;
        Ok(AbilityScores {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        })
    }

    async fn get_campaign_participants(
        &self,
        campaign_id: Uuid,
    ) -> Result<CampaignParticipants, DomainError> {
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT campaign_id FROM campaigns WHERE campaign_id = $1")
                .bind(campaign_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;
        if exists.is_none() {
            return Err(DomainError::not_found("campaign", campaign_id));
        }

        let rows: Vec<(Uuid, String, String)> = sqlx::query_as(
            "SELECT entity_id, entity_type, name FROM campaign_participants \
             WHERE campaign_id = $1 ORDER BY name, entity_id",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        let mut participants = CampaignParticipants::default();
        for (entity_id, entity_type, name) in rows {
            let summary = ParticipantSummary { entity_id, name };
            match parse_entity_type(&entity_type)? {
                EntityType::PlayerCharacter => participants.player_characters.push(summary),
                EntityType::Npc => participants.npcs.push(summary),
                EntityType::Monster => participants.monsters.push(summary),
            }
        }
        Ok(participants)
    }

    async fn character_owns_item(
        &self,
        player_character_id: Uuid,
        item_id: Uuid,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM character_items \
             WHERE player_character_id = $1 AND item_id = $2)",
        )
        .bind(player_character_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))
    }
}

// --- In-memory ---

#[derive(Debug, Clone)]
struct DirectoryEntry {
    campaign_id: Uuid,
    entity_type: EntityType,
    name: String,
    scores: AbilityScores,
}

/// Participant directory held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParticipantDirectory {
    campaigns: HashSet<Uuid>,
    /// Insertion order doubles as listing order.
    entries: Vec<(Uuid, DirectoryEntry)>,
    items: HashMap<Uuid, HashSet<Uuid>>,
}

impl InMemoryParticipantDirectory {
    /// Starts an empty directory.
    #[must_use]
    pub fn builder() -> InMemoryParticipantDirectoryBuilder {
        InMemoryParticipantDirectoryBuilder::default()
    }

    fn entry(&self, entity_id: Uuid) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|(id, _)| *id == entity_id)
            .map(|(_, entry)| entry)
    }
}

/// Directory contents as loaded from a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySeed {
    /// Campaigns and their rosters.
    #[serde(default)]
    pub campaigns: Vec<CampaignSeed>,
}

/// One campaign in a [`DirectorySeed`].
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignSeed {
    /// Campaign identifier.
    pub campaign_id: Uuid,
    /// Player characters, NPCs and monsters.
    #[serde(default)]
    pub participants: Vec<ParticipantSeed>,
    /// Inventory entries.
    #[serde(default)]
    pub items: Vec<ItemSeed>,
}

/// One participant in a [`CampaignSeed`].
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantSeed {
    pub entity_id: Uuid,
    pub entity_type: EntityType,
    pub name: String,
    /// Defaults to all tens.
    #[serde(default)]
    pub ability_scores: AbilityScores,
}

/// An item held by a player character.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ItemSeed {
    pub player_character_id: Uuid,
    pub item_id: Uuid,
}

impl InMemoryParticipantDirectory {
    /// Builds a directory from seed data, keeping the seed's order.
    #[must_use]
    pub fn from_seed(seed: &DirectorySeed) -> Self {
        let mut builder = Self::builder();
        for campaign in &seed.campaigns {
            builder = builder.campaign(campaign.campaign_id);
            for participant in &campaign.participants {
                builder = builder.participant(
                    campaign.campaign_id,
                    participant.entity_id,
                    participant.entity_type,
                    &participant.name,
                    participant.ability_scores,
                );
            }
            for item in &campaign.items {
                builder = builder.item(item.player_character_id, item.item_id);
            }
        }
        builder.build()
    }
}

/// Seeds an [`InMemoryParticipantDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryParticipantDirectoryBuilder {
    directory: InMemoryParticipantDirectory,
}

impl InMemoryParticipantDirectoryBuilder {
    /// Registers a campaign with no participants.
    #[must_use]
    pub fn campaign(mut self, campaign_id: Uuid) -> Self {
        self.directory.campaigns.insert(campaign_id);
        self
    }

    fn participant(
        mut self,
        campaign_id: Uuid,
        entity_id: Uuid,
        entity_type: EntityType,
        name: &str,
        scores: AbilityScores,
    ) -> Self {
        self.directory.campaigns.insert(campaign_id);
        self.directory.entries.push((
            entity_id,
            DirectoryEntry {
                campaign_id,
                entity_type,
                name: name.to_owned(),
                scores,
            },
        ));
        self
    }

    /// Adds a player character to a campaign.
    #[must_use]
    pub fn player_character(self, campaign_id: Uuid, entity_id: Uuid, name: &str, scores: AbilityScores) -> Self {
        self.participant(campaign_id, entity_id, EntityType::PlayerCharacter, name, scores)
    }

    /// Adds an NPC to a campaign.
    #[must_use]
    pub fn npc(self, campaign_id: Uuid, entity_id: Uuid, name: &str, scores: AbilityScores) -> Self {
        self.participant(campaign_id, entity_id, EntityType::Npc, name, scores)
    }

    /// Adds a monster to a campaign.
    #[must_use]
    pub fn monster(self, campaign_id: Uuid, entity_id: Uuid, name: &str, scores: AbilityScores) -> Self {
        self.participant(campaign_id, entity_id, EntityType::Monster, name, scores)
    }

    /// Puts an item in a player character's inventory.
    #[must_use]
    pub fn item(mut self, player_character_id: Uuid, item_id: Uuid) -> Self {
        self.directory
            .items
            .entry(player_character_id)
            .or_default()
            .insert(item_id);
        self
    }

    /// Finishes seeding.
    #[must_use]
    pub fn build(self) -> InMemoryParticipantDirectory {
        self.directory
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryParticipantDirectory {
    async fn get_ability_scores(
        &self,
        entity_id: Uuid,
        entity_type: EntityType,
    ) -> Result<AbilityScores, DomainError> {
        self.entry(entity_id)
            .filter(|entry| entry.entity_type == entity_type)
            .map(|entry| entry.scores)
            .ok_or_else(|| DomainError::not_found(entity_name(entity_type), entity_id))
    }

    async fn get_campaign_participants(
        &self,
        campaign_id: Uuid,
    ) -> Result<CampaignParticipants, DomainError> {
        if !self.campaigns.contains(&campaign_id) {
            return Err(DomainError::not_found("campaign", campaign_id));
        }
        let mut participants = CampaignParticipants::default();
        for (entity_id, entry) in self.entries.iter().filter(|(_, e)| e.campaign_id == campaign_id) {
            let summary = ParticipantSummary {
                entity_id: *entity_id,
                name: entry.name.clone(),
            };
            match entry.entity_type {
                EntityType::PlayerCharacter => participants.player_characters.push(summary),
                EntityType::Npc => participants.npcs.push(summary),
                EntityType::Monster => participants.monsters.push(summary),
            }
        }
        Ok(participants)
    }

    async fn character_owns_item(
        &self,
        player_character_id: Uuid,
        item_id: Uuid,
    ) -> Result<bool, DomainError> {
        Ok(self
            .items
            .get(&player_character_id)
            .is_some_and(|items| items.contains(&item_id)))
    }
}
