//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use questboard_core::error::DomainError;
use questboard_core::repository::{EventRepository, StoredEvent};

/// `SQLSTATE` for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

type EventRow = (
    Uuid,
    Uuid,
    String,
    serde_json::Value,
    i64,
    Uuid,
    Uuid,
    DateTime<Utc>,
);

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(e: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("event store: {e}"))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

async fn current_version(
    tx: &mut Transaction<'_, Postgres>,
    aggregate_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(sequence_number), 0) FROM domain_events WHERE aggregate_id = $1",
    )
    .bind(aggregate_id)
    .fetch_one(&mut **tx)
    .await
}

/// Splits an RFC 6901 JSON pointer into a Postgres text-array path.
fn pointer_to_path(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT event_id, aggregate_id, event_type, payload, sequence_number, \
                    correlation_id, causation_id, occurred_at \
             FROM domain_events WHERE aggregate_id = $1 ORDER BY sequence_number",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    event_id,
                    aggregate_id,
                    event_type,
                    payload,
                    sequence_number,
                    correlation_id,
                    causation_id,
                    occurred_at,
                )| StoredEvent {
                    event_id,
                    aggregate_id,
                    event_type,
                    payload,
                    sequence_number,
                    correlation_id,
                    causation_id,
                    occurred_at,
                },
            )
            .collect())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        let actual = current_version(&mut tx, aggregate_id)
            .await
            .map_err(|e| infrastructure(&e))?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            let inserted = sqlx::query(
                "INSERT INTO domain_events \
                    (event_id, aggregate_id, event_type, payload, sequence_number, \
                     correlation_id, causation_id, occurred_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id)
            .bind(event.aggregate_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.sequence_number)
            .bind(event.correlation_id)
            .bind(event.causation_id)
            .bind(event.occurred_at)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                if is_unique_violation(&e) {
                    // Another writer committed between the version check and
                    // this insert; the transaction rolls back on drop.
                    drop(tx);
                    let actual = self
                        .load_events(aggregate_id)
                        .await?
                        .last()
                        .map_or(0, |e| e.sequence_number);
                    warn!(%aggregate_id, expected_version, actual, "lost append race");
                    return Err(DomainError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual,
                    });
                }
                return Err(infrastructure(&e));
            }
        }

        tx.commit().await.map_err(|e| infrastructure(&e))?;
        debug!(%aggregate_id, count = events.len(), "appended events");
        Ok(())
    }

    async fn find_aggregate_by_payload(
        &self,
        event_type: &str,
        pointer: &str,
        value: &serde_json::Value,
    ) -> Result<Option<Uuid>, DomainError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT aggregate_id FROM domain_events \
             WHERE event_type = $1 AND payload #> $2 = $3 \
             LIMIT 1",
        )
        .bind(event_type)
        .bind(pointer_to_path(pointer))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))
    }
}
