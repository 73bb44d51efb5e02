//! Transport-level errors that never reach into the engine: a thin wrapper
//! that either forwards an `EngineError`'s wire event or reports a
//! malformed envelope.

use tablehub_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("room not found")]
    RoomNotFound,

    #[error("malformed message: {0}")]
    BadPayload(String),
}

impl ServerError {
    #[must_use]
    pub fn wire_event(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.wire_event(),
            Self::RoomNotFound => "join-error",
            Self::BadPayload(_) => "invalid-move",
        }
    }
}
