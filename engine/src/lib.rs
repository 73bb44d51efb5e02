//! Authoritative game engines, hand evaluation, rooms, and matchmaking for a
//! realtime multiplayer games hub.
//!
//! This crate is the single source of truth for every multiplayer match: it
//! has no I/O, no async runtime, and no wall-clock dependency. The server
//! binary wraps it in an event loop; everything here is a pure state
//! machine reachable through `Room`/`GameEngine::make_move`.

pub mod bot;
pub mod cards;
pub mod challenge;
pub mod errors;
pub mod game;
pub mod games;
pub mod hand_eval;
pub mod poker;
pub mod pot;
pub mod registry;
pub mod room;

pub use bot::{BotDifficulty, BotDecisionMaker, DifficultyParams};
pub use cards::{Card, CardView, Deck, Suit};
pub use challenge::{Challenge, ChallengeService, ChallengeState};
pub use errors::EngineError;
pub use game::{Engine, GameEngine, GameType, Move, MoveOutcome};
pub use registry::{RegistryEvent, UserRegistry, UserStatus, UserSummary};
pub use room::{generate_room_code, Room, RoomError, RoomLifecycle, Seat, SeatKind};

/// A player's identity inside the engine: the connection id for humans, a
/// synthetic stable id for bots.
pub type PlayerId = String;
