//! Questboard Core — shared domain abstractions.
//!
//! This crate defines the traits and types the live interaction engine and
//! its adapters depend on: event-sourced aggregates, the error taxonomy,
//! time and randomness seams, and the read-only participant directory
//! contract. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod participant;
pub mod repository;
pub mod rng;
