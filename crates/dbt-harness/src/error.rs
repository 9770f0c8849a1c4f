//! Harness error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn engine {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Engine exited before reporting a best move")]
    EngineExited,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Position error: {0}")]
    Position(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
