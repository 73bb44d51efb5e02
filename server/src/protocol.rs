//! The `(event: string, payload: JSON)` wire contract.
//!
//! Unlike `tablehub_engine::Move`, which is an internally-tagged enum, the
//! envelope here is a flat `{event, payload}` pair, so client payloads are
//! decoded on demand once the `event` string has picked a handler, rather
//! than through one big tagged union.

use serde::{Deserialize, Serialize};
use tablehub_engine::{GameType, Move};

#[derive(Debug, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ServerEnvelope {
    pub event: &'static str,
    pub payload: serde_json::Value,
}

impl ServerEnvelope {
    #[must_use]
    pub fn new(event: &'static str, payload: serde_json::Value) -> Self {
        Self { event, payload }
    }
}

pub mod client_event {
    pub const USER_CONNECT: &str = "user-connect";
    pub const CREATE_ROOM: &str = "create-room";
    pub const JOIN_ROOM: &str = "join-room";
    pub const START_GAME: &str = "start-game";
    pub const MAKE_MOVE: &str = "make-move";
    pub const REQUEST_STATE: &str = "request-state";
    pub const REQUEST_REMATCH: &str = "request-rematch";
    pub const SEND_CHALLENGE: &str = "send-challenge";
    pub const ACCEPT_CHALLENGE: &str = "accept-challenge";
    pub const DECLINE_CHALLENGE: &str = "decline-challenge";
}

pub mod server_event {
    pub const USER_LIST: &str = "user-list";
    pub const USER_JOINED: &str = "user-joined";
    pub const USER_LEFT: &str = "user-left";
    pub const USER_STATUS: &str = "user-status";
    pub const ROOM_CREATED: &str = "room-created";
    pub const PLAYER_JOINED: &str = "player-joined";
    pub const JOIN_ERROR: &str = "join-error";
    pub const GAME_START: &str = "game-start";
    pub const GAME_LOBBY_READY: &str = "game-lobby-ready";
    pub const MOVE_MADE: &str = "move-made";
    pub const INVALID_MOVE: &str = "invalid-move";
    pub const GAME_OVER: &str = "game-over";
    pub const STATE_RESPONSE: &str = "state-response";
    pub const REMATCH_REQUESTED: &str = "rematch-requested";
    pub const CHALLENGE_RECEIVED: &str = "challenge-received";
    pub const CHALLENGE_ACCEPTED: &str = "challenge-accepted";
    pub const CHALLENGE_DECLINED: &str = "challenge-declined";
    pub const OPPONENT_DISCONNECTED: &str = "opponent-disconnected";
    pub const NAME_ERROR: &str = "name-error";
    pub const NAME_ACCEPTED: &str = "name-accepted";
}

#[derive(Debug, Deserialize)]
pub struct UserConnectPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomPayload {
    #[serde(rename = "gameType")]
    pub game_type: GameType,
    #[serde(rename = "playerName")]
    pub player_name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomPayload {
    #[serde(rename = "roomCode")]
    pub room_code: String,
    #[serde(rename = "playerName")]
    pub player_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StartGamePayload {
    #[serde(rename = "roomCode")]
    pub room_code: String,
    #[serde(rename = "aiCount")]
    pub ai_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MakeMovePayload {
    #[serde(rename = "roomCode")]
    pub room_code: String,
    #[serde(rename = "move")]
    pub mv: Move,
}

#[derive(Debug, Deserialize)]
pub struct RoomCodePayload {
    #[serde(rename = "roomCode")]
    pub room_code: String,
}

#[derive(Debug, Deserialize)]
pub struct SendChallengePayload {
    #[serde(rename = "toId")]
    pub to_id: String,
    #[serde(rename = "gameType")]
    pub game_type: GameType,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeIdPayload {
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
}
