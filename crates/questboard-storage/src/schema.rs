//! Database schema.
//!
//! The same DDL lives in the workspace `migrations/` directory, which the
//! `#[sqlx::test]` suites apply. The server calls [`ensure_schema`] at
//! startup so a fresh database works without a migration step.

use sqlx::PgPool;
use tracing::info;

/// SQL to create the events table.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS domain_events (
    event_id        UUID PRIMARY KEY,
    aggregate_id    UUID NOT NULL,
    event_type      VARCHAR(255) NOT NULL,
    payload         JSONB NOT NULL,
    sequence_number BIGINT NOT NULL,
    correlation_id  UUID NOT NULL,
    causation_id    UUID NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (aggregate_id, sequence_number)
);

CREATE INDEX IF NOT EXISTS idx_domain_events_aggregate_id
    ON domain_events (aggregate_id, sequence_number);

CREATE INDEX IF NOT EXISTS idx_domain_events_correlation_id
    ON domain_events (correlation_id);

CREATE INDEX IF NOT EXISTS idx_domain_events_event_type
    ON domain_events (event_type);
";

/// SQL to create the participant directory tables.
pub const CREATE_DIRECTORY_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS campaigns (
    campaign_id UUID PRIMARY KEY,
    name        VARCHAR(255) NOT NULL
);

CREATE TABLE IF NOT EXISTS campaign_participants (
    entity_id    UUID PRIMARY KEY,
    campaign_id  UUID NOT NULL REFERENCES campaigns (campaign_id),
    entity_type  VARCHAR(32) NOT NULL
        CHECK (entity_type IN ('player_character', 'npc', 'monster')),
    name         VARCHAR(255) NOT NULL,
    strength     INTEGER NOT NULL DEFAULT 10,
    dexterity    INTEGER NOT NULL DEFAULT 10,
    constitution INTEGER NOT NULL DEFAULT 10,
    intelligence INTEGER NOT NULL DEFAULT 10,
    wisdom       INTEGER NOT NULL DEFAULT 10,
    charisma     INTEGER NOT NULL DEFAULT 10
);

CREATE INDEX IF NOT EXISTS idx_campaign_participants_campaign_id
    ON campaign_participants (campaign_id);

CREATE TABLE IF NOT EXISTS character_items (
    player_character_id UUID NOT NULL REFERENCES campaign_participants (entity_id),
    item_id             UUID NOT NULL,
    PRIMARY KEY (player_character_id, item_id)
);
";

/// Creates every table the adapters need, if missing.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(CREATE_EVENTS_TABLE).execute(pool).await?;
    sqlx::raw_sql(CREATE_DIRECTORY_TABLES).execute(pool).await?;
    info!("database schema ready");
    Ok(())
}
