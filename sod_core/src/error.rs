//! Error types for simulation setup and casting

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while building or running a simulation
#[derive(Debug, Error)]
pub enum SimError {
    /// A cast was attempted while one of its requirements was unmet
    #[error("cannot cast {spell}: {reason}")]
    CannotCast { spell: String, reason: String },

    #[error("unknown spell '{0}'")]
    UnknownSpell(String),

    #[error("unknown aura '{0}'")]
    UnknownAura(String),

    #[error("unknown item set '{0}'")]
    UnknownItemSet(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
