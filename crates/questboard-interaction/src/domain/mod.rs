//! Domain model for live interactions.

pub mod actions;
pub mod aggregates;
pub mod commands;
pub mod events;
pub mod initiative;
pub mod rewards;
