//! A `Room` is one match's full lifecycle: seats, the engine once started,
//! and rematch bookkeeping.

use crate::bot::BotDifficulty;
use crate::errors::EngineError;
use crate::game::{Engine, GameEngine, GameType};
use crate::PlayerId;
use rand::seq::IteratorRandom;
use serde::Serialize;
use std::collections::HashSet;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_LEN: usize = 4;

/// Draws a fresh 4-character uppercase code that doesn't collide with any
/// code `is_live` reports as already in use.
pub fn generate_room_code(mut is_live: impl FnMut(&str) -> bool) -> String {
    let mut rng = rand::rng();
    loop {
        let code: String = (0..CODE_LEN)
            .map(|_| *CODE_ALPHABET.iter().choose(&mut rng).expect("alphabet is non-empty") as char)
            .collect();
        if !is_live(&code) {
            return code;
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatKind {
    Human,
    Bot,
}

#[derive(Clone, Debug, Serialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub kind: SeatKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<BotDifficulty>,
}

impl Seat {
    #[must_use]
    pub fn human(id: PlayerId, name: String) -> Self {
        Self { id, name, kind: SeatKind::Human, difficulty: None }
    }

    #[must_use]
    pub fn bot(id: PlayerId, name: String, difficulty: BotDifficulty) -> Self {
        Self { id, name, kind: SeatKind::Bot, difficulty: Some(difficulty) }
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.kind == SeatKind::Bot
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomLifecycle {
    Waiting,
    Playing,
    Closed,
}

#[derive(Debug, Eq, PartialEq)]
pub enum RoomError {
    Closed,
    Full,
    AlreadyStarted,
    NotStarted,
    NotHost,
}

impl From<RoomError> for EngineError {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::Closed | RoomError::Full => Self::RoomFull,
            RoomError::AlreadyStarted | RoomError::NotStarted | RoomError::NotHost => {
                Self::IllegalMove("That action isn't valid for this room right now.".to_string())
            }
        }
    }
}

/// One active match, from an empty waiting room through to close. Seat 0 is always the host; `seats` is otherwise in join order.
#[derive(Clone, Debug)]
pub struct Room {
    pub code: String,
    pub game_type: GameType,
    pub max_players: usize,
    pub seats: Vec<Seat>,
    pub engine: Option<Engine>,
    rematch_votes: HashSet<PlayerId>,
    closed: bool,
}

impl Room {
    #[must_use]
    pub fn new(code: String, host: Seat, game_type: GameType) -> Self {
        Self {
            code,
            game_type,
            max_players: game_type.max_players(),
            seats: vec![host],
            engine: None,
            rematch_votes: HashSet::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn host_id(&self) -> Option<&PlayerId> {
        self.seats.first().map(|s| &s.id)
    }

    #[must_use]
    pub fn lifecycle(&self) -> RoomLifecycle {
        if self.closed {
            RoomLifecycle::Closed
        } else if self.engine.is_some() {
            RoomLifecycle::Playing
        } else {
            RoomLifecycle::Waiting
        }
    }

    #[must_use]
    pub fn connected_humans(&self) -> usize {
        self.seats.iter().filter(|s| !s.is_bot()).count()
    }

    pub fn join(&mut self, seat: Seat) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::Closed);
        }
        if self.engine.is_some() {
            return Err(RoomError::AlreadyStarted);
        }
        if self.seats.len() >= self.max_players {
            return Err(RoomError::Full);
        }
        self.seats.push(seat);
        Ok(())
    }

    /// Starts the match. `ai_count` fills the remaining seats with bots —
    /// only meaningful for `GameType::is_lobby_mode()` rooms (Poker); it's
    /// ignored for every other game.
    pub fn start(&mut self, ai_count: usize, bot_difficulty: BotDifficulty, mut next_bot_id: impl FnMut() -> PlayerId) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::Closed);
        }
        if self.engine.is_some() {
            return Err(RoomError::AlreadyStarted);
        }
        if self.game_type.is_lobby_mode() {
            let room_for_bots = self.max_players.saturating_sub(self.seats.len());
            for i in 0..ai_count.min(room_for_bots) {
                let id = next_bot_id();
                self.seats.push(Seat::bot(id, format!("Bot {}", i + 1), bot_difficulty));
            }
        }
        let ids: Vec<PlayerId> = self.seats.iter().map(|s| s.id.clone()).collect();
        self.engine = Some(self.game_type.new_engine(ids));
        Ok(())
    }

    /// Records a rematch vote. Once every non-bot seat has voted, resets the
    /// engine from the current seat list and clears the votes.
    pub fn request_rematch(&mut self, seat_id: &PlayerId) -> Result<bool, RoomError> {
        if self.engine.is_none() {
            return Err(RoomError::NotStarted);
        }
        if !self.seats.iter().any(|s| &s.id == seat_id) {
            return Err(RoomError::NotHost);
        }
        self.rematch_votes.insert(seat_id.clone());
        let quorum = self.seats.iter().filter(|s| !s.is_bot()).all(|s| self.rematch_votes.contains(&s.id));
        if quorum {
            let ids: Vec<PlayerId> = self.seats.iter().map(|s| s.id.clone()).collect();
            self.engine = Some(self.game_type.new_engine(ids));
            self.rematch_votes.clear();
        }
        Ok(quorum)
    }

    /// Forwards a disconnect/leave to the engine and closes the room if too
    /// few humans remain, using `game_type.min_players()` so Poker's lobby
    /// mode only closes when the last human is gone.
    pub fn remove(&mut self, seat_id: &PlayerId) {
        self.rematch_votes.remove(seat_id);
        if let Some(engine) = &mut self.engine {
            engine.remove_player(seat_id);
        }
        self.seats.retain(|s| &s.id != seat_id);
        if self.connected_humans() < self.game_type.min_players() {
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_four_uppercase_chars() {
        let code = generate_room_code(|_| false);
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_codes_avoid_collisions() {
        let mut calls = 0;
        let code = generate_room_code(|_| {
            calls += 1;
            calls <= 3
        });
        assert_eq!(code.len(), 4);
        assert!(calls >= 4);
    }

    #[test]
    fn join_rejects_when_full() {
        let mut room = Room::new("ABCD".into(), Seat::human("h".into(), "Host".into()), GameType::War);
        room.join(Seat::human("p2".into(), "P2".into())).unwrap();
        let err = room.join(Seat::human("p3".into(), "P3".into())).unwrap_err();
        assert_eq!(err, RoomError::Full);
    }

    #[test]
    fn poker_start_fills_remaining_seats_with_bots() {
        let mut room = Room::new("ABCD".into(), Seat::human("h".into(), "Host".into()), GameType::Poker);
        let mut n = 0;
        room.start(3, BotDifficulty::Medium, || {
            n += 1;
            format!("bot-{n}")
        }).unwrap();
        assert_eq!(room.seats.len(), 4);
        assert!(room.seats[1..].iter().all(Seat::is_bot));
    }

    #[test]
    fn non_lobby_game_ignores_ai_count() {
        let mut room = Room::new("ABCD".into(), Seat::human("h".into(), "Host".into()), GameType::War);
        room.join(Seat::human("p2".into(), "P2".into())).unwrap();
        room.start(5, BotDifficulty::Easy, || "bot".to_string()).unwrap();
        assert_eq!(room.seats.len(), 2);
    }

    #[test]
    fn rematch_needs_every_human_seat_but_not_bots() {
        let mut room = Room::new("ABCD".into(), Seat::human("h".into(), "Host".into()), GameType::Poker);
        room.start(1, BotDifficulty::Easy, || "bot-1".to_string()).unwrap();
        assert_eq!(room.seats.len(), 2);
        let quorum = room.request_rematch(&"h".to_string()).unwrap();
        assert!(quorum, "the lone human seat is quorum on its own");
    }

    #[test]
    fn room_closes_once_humans_drop_below_minimum() {
        let mut room = Room::new("ABCD".into(), Seat::human("h".into(), "Host".into()), GameType::War);
        room.join(Seat::human("p2".into(), "P2".into())).unwrap();
        room.start(0, BotDifficulty::Easy, || "bot".to_string()).unwrap();
        room.remove(&"p2".to_string());
        assert_eq!(room.lifecycle(), RoomLifecycle::Closed);
    }
}
