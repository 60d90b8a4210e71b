use thiserror::Error;
use volleyball_shared::types::Team;

/// Errors raised at the environment's boundaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("action branch {branch} has out-of-range value {value}")]
    InvalidAction { branch: usize, value: i32 },

    #[error("action vector must have 4 branches, got {0}")]
    ActionArity(usize),

    #[error("unknown event code: {0}")]
    UnknownEvent(u8),

    #[error("agents must belong to a team, got {0:?}")]
    UnassignedAgent(Team),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EnvError>;
