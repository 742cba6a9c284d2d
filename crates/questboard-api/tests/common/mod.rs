//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use questboard_core::clock::Clock;
use questboard_core::participant::{AbilityScores, ParticipantDirectory};
use questboard_core::repository::EventRepository;
use questboard_core::rng::DeterministicRng;
use questboard_notifier::NotificationHub;
use questboard_storage::{PgEventRepository, PgParticipantDirectory};
use questboard_test_support::{
    FixedClock, InMemoryEventRepository, InMemoryParticipantDirectory, SequenceRng,
};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use questboard_api::build_router;
use questboard_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// A campaign with two player characters and a monster.
#[derive(Debug, Clone, Copy)]
pub struct Party {
    pub campaign_id: Uuid,
    /// DEX 14.
    pub sera: Uuid,
    /// DEX 10.
    pub bram: Uuid,
    /// DEX 10.
    pub troll: Uuid,
    /// Owned by Sera.
    pub rope: Uuid,
}

impl Party {
    pub fn new() -> Self {
        Self {
            campaign_id: Uuid::new_v4(),
            sera: Uuid::new_v4(),
            bram: Uuid::new_v4(),
            troll: Uuid::new_v4(),
            rope: Uuid::new_v4(),
        }
    }

    pub fn directory(&self) -> InMemoryParticipantDirectory {
        InMemoryParticipantDirectory::builder()
            .player_character(
                self.campaign_id,
                self.sera,
                "Sera",
                AbilityScores {
                    dexterity: 14,
                    ..AbilityScores::default()
                },
            )
            .player_character(self.campaign_id, self.bram, "Bram", AbilityScores::default())
            .monster(self.campaign_id, self.troll, "Bridge Troll", AbilityScores::default())
            .item(self.sera, self.rope)
            .build()
    }

    /// Writes the same roster into the directory tables.
    pub async fn insert_into(&self, pool: &PgPool) {
        sqlx::query("INSERT INTO campaigns (campaign_id, name) VALUES ($1, 'Test campaign')")
            .bind(self.campaign_id)
            .execute(pool)
            .await
            .unwrap();
        for (entity_id, entity_type, name, dexterity) in [
            (self.sera, "player_character", "Sera", 14),
            (self.bram, "player_character", "Bram", 10),
            (self.troll, "monster", "Bridge Troll", 10),
        ] {
            sqlx::query(
                "INSERT INTO campaign_participants \
                 (entity_id, campaign_id, entity_type, name, dexterity) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(entity_id)
            .bind(self.campaign_id)
            .bind(entity_type)
            .bind(name)
            .bind(dexterity)
            .execute(pool)
            .await
            .unwrap();
        }
        sqlx::query("INSERT INTO character_items (player_character_id, item_id) VALUES ($1, $2)")
            .bind(self.sera)
            .bind(self.rope)
            .execute(pool)
            .await
            .unwrap();
    }
}

fn app_state(
    event_repository: Arc<dyn EventRepository>,
    directory: Arc<dyn ParticipantDirectory>,
    rng: SequenceRng,
) -> AppState {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    AppState::new(
        fixed_clock(),
        rng,
        event_repository,
        directory,
        Arc::new(NotificationHub::default()),
    )
}

/// Build the full app router over in-memory storage. Clone the router to
/// send several requests against the same state.
pub fn build_test_app(party: &Party) -> Router {
    build_test_app_with_rng(party, SequenceRng::new(vec![]))
}

/// Build the full app router with a custom `SequenceRng` for tests that need
/// deterministic initiative rolls.
pub fn build_test_app_with_rng(party: &Party, rng: SequenceRng) -> Router {
    build_router(app_state(
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(party.directory()),
        rng,
    ))
}

/// Build the full app router with the PostgreSQL adapters.
pub fn build_pg_test_app(pool: PgPool, rng: SequenceRng) -> Router {
    build_router(app_state(
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(PgParticipantDirectory::new(pool)),
        rng,
    ))
}

async fn into_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    into_json(app.clone().oneshot(request).await.unwrap()).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    into_json(app.clone().oneshot(request).await.unwrap()).await
}

/// Creates an interaction with the whole party and returns its id.
pub async fn create_interaction(app: &Router, party: &Party) -> Uuid {
    let (status, json) = post_json(
        app,
        "/api/v1/interactions",
        &serde_json::json!({
            "campaign_id": party.campaign_id,
            "name": "Ambush at the bridge",
            "description": "The troll wants a toll.",
            "player_character_ids": [party.sera, party.bram],
            "monster_ids": [party.troll],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {json}");
    json["aggregate_id"].as_str().unwrap().parse().unwrap()
}

/// Rolls a manual order: Sera 18, troll 12, Bram 7.
pub async fn roll_manual(app: &Router, party: &Party, interaction_id: Uuid) {
    let (status, json) = post_json(
        app,
        &format!("/api/v1/interactions/{interaction_id}/initiative"),
        &serde_json::json!({ "rolls": [
            { "entity_id": party.sera, "entity_type": "player_character", "initiative_roll": 18 },
            { "entity_id": party.bram, "entity_type": "player_character", "initiative_roll": 7 },
            { "entity_id": party.troll, "entity_type": "monster", "initiative_roll": 12 },
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "roll failed: {json}");
}
