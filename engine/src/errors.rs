//! Structured engine errors.
//!
//! Every variant maps onto exactly one row of the error taxonomy: the server
//! crate matches on these to choose which wire event to emit.

use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EngineError {
    #[error("Name already taken.")]
    NameInUse,

    #[error("Room not found.")]
    RoomNotFound,

    #[error("Room is full.")]
    RoomFull,

    #[error("It's not your turn.")]
    NotYourTurn,

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("That move isn't allowed in the current phase.")]
    PhaseViolation,

    #[error("Not enough chips for that action.")]
    InsufficientChips,

    #[error("Not enough cards for that action.")]
    InsufficientCards,

    #[error("Opponent disconnected.")]
    Disconnected,
}

impl EngineError {
    /// The event name the server broadcasts this error under.
    #[must_use]
    pub fn wire_event(&self) -> &'static str {
        match self {
            Self::NameInUse => "name-error",
            Self::RoomNotFound | Self::RoomFull => "join-error",
            Self::NotYourTurn
            | Self::IllegalMove(_)
            | Self::PhaseViolation
            | Self::InsufficientChips
            | Self::InsufficientCards => "invalid-move",
            Self::Disconnected => "opponent-disconnected",
        }
    }
}
