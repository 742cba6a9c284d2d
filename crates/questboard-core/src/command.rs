//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted command name, used for logging and tracing fields.
    fn command_type(&self) -> &'static str;

    /// Correlation ID carried into every event the command produces.
    fn correlation_id(&self) -> Uuid;
}
