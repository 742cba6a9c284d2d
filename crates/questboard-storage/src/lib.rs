//! Questboard Storage — persistence adapters.
//!
//! PostgreSQL-backed implementations of the core `EventRepository` and
//! `ParticipantDirectory` traits, plus in-memory counterparts used when the
//! server runs without a database and by tests.

pub mod directory;
pub mod in_memory;
pub mod pg_event_repository;
pub mod schema;

pub use directory::{
    CampaignSeed, DirectorySeed, InMemoryParticipantDirectory, InMemoryParticipantDirectoryBuilder,
    ItemSeed, ParticipantSeed, PgParticipantDirectory,
};
pub use in_memory::InMemoryEventRepository;
pub use pg_event_repository::PgEventRepository;
