use thiserror::Error;

use crate::{Action, PositionSide};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid transition: {action} while {side}")]
    InvalidTransition { action: Action, side: PositionSide },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
