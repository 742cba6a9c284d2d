//! Questboard — Live Interaction bounded context.
//!
//! Responsible for running a turn-based scene: rolling initiative, tracking
//! whose turn it is, taking player action submissions, routing them through
//! GM review, gating turn advancement on that review, and recording rewards
//! when the scene completes.

pub mod application;
pub mod domain;
