//! Application services: command handlers, query handlers and the
//! per-interaction transaction boundary.

pub mod command_handlers;
pub mod locks;
pub(crate) mod notifications;
pub mod query_handlers;
