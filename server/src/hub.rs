//! The process-wide hub: user registry, challenge service, and the room
//! index, guarded by a single lock. Rooms here are cheap and short-lived
//! enough that they don't need their own tokio task each, so one lock
//! around every room stands in for a per-room actor.
//!
//! AI turns are driven from here too: scheduling a bot's move is
//! `tokio::spawn` of a jittered sleep followed by the same `apply_move`
//! path a human's `make-move` goes through, so the driver has no privileged
//! access to engine state.

use crate::config::HubConfig;
use crate::protocol::{server_event, ServerEnvelope};
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tablehub_engine::{
    BotDecisionMaker, BotDifficulty, Challenge, ChallengeService, DifficultyParams, EngineError,
    GameType, Move, RegistryEvent, Room, RoomLifecycle, Seat, UserRegistry, UserStatus,
};

pub type PlayerId = String;

struct HubState {
    registry: UserRegistry,
    challenges: ChallengeService,
    rooms: HashMap<String, Room>,
    connections: HashMap<PlayerId, tokio::sync::mpsc::UnboundedSender<String>>,
    room_of: HashMap<PlayerId, String>,
}

pub struct Hub {
    state: Mutex<HubState>,
    started_at: Instant,
    config: HubConfig,
}

impl Hub {
    #[must_use]
    pub fn new(config: HubConfig) -> Arc<Self> {
        let ttl = config.challenge_ttl;
        Arc::new(Self {
            state: Mutex::new(HubState {
                registry: UserRegistry::new(),
                challenges: ChallengeService::new(ttl),
                rooms: HashMap::new(),
                connections: HashMap::new(),
                room_of: HashMap::new(),
            }),
            started_at: Instant::now(),
            config,
        })
    }

    fn now(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn register_connection(&self, id: PlayerId, tx: tokio::sync::mpsc::UnboundedSender<String>) {
        self.state.lock().unwrap().connections.insert(id, tx);
    }

    fn send_to(&self, state: &HubState, id: &PlayerId, event: &'static str, payload: serde_json::Value) {
        if let Some(tx) = state.connections.get(id) {
            if let Ok(text) = serde_json::to_string(&ServerEnvelope::new(event, payload)) {
                let _ = tx.send(text);
            }
        }
    }

    fn broadcast_all(&self, state: &HubState, except: Option<&PlayerId>, event: &'static str, payload: serde_json::Value) {
        for id in state.connections.keys().cloned().collect::<Vec<_>>() {
            if Some(&id) != except {
                self.send_to(state, &id, event, payload.clone());
            }
        }
    }

    fn broadcast_room(&self, state: &HubState, room: &Room, event: &'static str, payload: serde_json::Value) {
        for seat in &room.seats {
            if !seat.is_bot() {
                self.send_to(state, &seat.id, event, payload.clone());
            }
        }
    }

    /// Sends every human seat its own redacted snapshot under the same event
    /// name.
    fn broadcast_room_state(&self, state: &HubState, room: &Room, event: &'static str, extra: serde_json::Value) {
        let Some(engine) = &room.engine else { return };
        for seat in &room.seats {
            if seat.is_bot() {
                continue;
            }
            let mut payload = extra.clone();
            if let Some(obj) = payload.as_object_mut() {
                obj.insert("gameState".to_string(), engine.get_state(&seat.id));
                obj.insert("roomCode".to_string(), json!(room.code));
            }
            self.send_to(state, &seat.id, event, payload);
        }
    }

    fn broadcast_registry_event(&self, state: &HubState, except: Option<&PlayerId>, event: RegistryEvent) {
        match event {
            RegistryEvent::UserJoined(summary) => {
                self.broadcast_all(state, except, server_event::USER_JOINED, json!(summary));
            }
            RegistryEvent::UserLeft(id) => {
                self.broadcast_all(state, except, server_event::USER_LEFT, json!({ "id": id }));
            }
            RegistryEvent::UserStatus(summary) => {
                self.broadcast_all(state, except, server_event::USER_STATUS, json!(summary));
            }
        }
    }

    // ---- registry -----------------------------------------------------

    pub fn user_connect(&self, id: &PlayerId, name: String) {
        let mut guard = self.state.lock().unwrap();
        match guard.registry.add(id.clone(), name) {
            Ok((snapshot, event)) => {
                self.send_to(&guard, id, server_event::NAME_ACCEPTED, json!({}));
                self.send_to(&guard, id, server_event::USER_LIST, json!({ "users": snapshot }));
                self.broadcast_registry_event(&guard, Some(id), event);
            }
            Err(EngineError::NameInUse) => {
                self.send_to(&guard, id, server_event::NAME_ERROR, json!({ "message": "Name already taken." }));
            }
            Err(_) => {}
        }
    }

    // ---- room lifecycle -------------------------------------------------

    pub fn create_room(&self, id: &PlayerId, game_type: GameType, player_name: String) {
        let mut guard = self.state.lock().unwrap();
        let code = tablehub_engine::generate_room_code(|c| guard.rooms.contains_key(c));
        let room = Room::new(code.clone(), Seat::human(id.clone(), player_name), game_type);
        let max_players = room.max_players;
        guard.rooms.insert(code.clone(), room);
        guard.room_of.insert(id.clone(), code.clone());
        if let Some(event) = guard.registry.set_status(id, UserStatus::InGame, Some(code.clone()), Some(game_type)) {
            self.broadcast_registry_event(&guard, Some(id), event);
        }
        self.send_to(&guard, id, server_event::ROOM_CREATED, json!({ "roomCode": code, "maxPlayers": max_players }));
    }

    pub fn join_room(&self, id: &PlayerId, room_code: String, player_name: String) {
        let mut guard = self.state.lock().unwrap();
        {
            let Some(room) = guard.rooms.get_mut(&room_code) else {
                self.send_to(&guard, id, server_event::JOIN_ERROR, json!({ "message": "Room not found." }));
                return;
            };
            if let Err(e) = room.join(Seat::human(id.clone(), player_name)) {
                let message = EngineError::from(e).to_string();
                self.send_to(&guard, id, server_event::JOIN_ERROR, json!({ "message": message }));
                return;
            }
        }
        let game_type = guard.rooms.get(&room_code).expect("just joined").game_type;
        guard.room_of.insert(id.clone(), room_code.clone());
        if let Some(event) = guard.registry.set_status(id, UserStatus::InGame, Some(room_code.clone()), Some(game_type)) {
            self.broadcast_registry_event(&guard, Some(id), event);
        }
        let room = guard.rooms.get(&room_code).expect("just joined");
        let payload = json!({ "roomCode": room_code, "seats": room.seats });
        self.broadcast_room(&guard, room, server_event::PLAYER_JOINED, payload);
    }

    pub fn start_game(self: &Arc<Self>, id: &PlayerId, room_code: String, ai_count: Option<usize>) {
        let difficulty = self.config.default_bot_difficulty;
        {
            let mut guard = self.state.lock().unwrap();
            {
                let Some(room) = guard.rooms.get(&room_code) else {
                    self.send_to(&guard, id, server_event::JOIN_ERROR, json!({ "message": "Room not found." }));
                    return;
                };
                if room.host_id() != Some(id) {
                    self.send_to(&guard, id, server_event::INVALID_MOVE, json!({ "message": "Only the host can start the game." }));
                    return;
                }
            }
            let mut bot_counter = 0u64;
            let code_for_bots = room_code.clone();
            let start = guard.rooms.get_mut(&room_code).expect("checked above").start(
                ai_count.unwrap_or(0),
                difficulty,
                || {
                    bot_counter += 1;
                    format!("bot-{code_for_bots}-{bot_counter}")
                },
            );
            if let Err(e) = start {
                self.send_to(&guard, id, server_event::INVALID_MOVE, json!({ "message": EngineError::from(e).to_string() }));
                return;
            }
            let room = guard.rooms.get(&room_code).expect("just started");
            self.broadcast_room_state(&guard, room, server_event::GAME_START, json!({}));
        }
        self.schedule_ai_if_needed(&room_code);
    }

    pub fn make_move(self: &Arc<Self>, id: &PlayerId, room_code: String, mv: Move) {
        self.apply_move(&room_code, id, mv);
    }

    fn apply_move(self: &Arc<Self>, room_code: &str, mover_id: &PlayerId, mv: Move) {
        {
            let mut guard = self.state.lock().unwrap();

            {
                let Some(room) = guard.rooms.get(room_code) else {
                    self.send_to(&guard, mover_id, server_event::INVALID_MOVE, json!({ "message": "Room not found." }));
                    return;
                };
                let Some(engine) = &room.engine else {
                    self.send_to(&guard, mover_id, server_event::INVALID_MOVE, json!({ "message": "The game hasn't started." }));
                    return;
                };
                let is_turn_exempt = matches!(mv, Move::BuyIn | Move::NextHand);
                if !is_turn_exempt && engine.current_actor().as_ref() != Some(mover_id) {
                    self.send_to(&guard, mover_id, server_event::INVALID_MOVE, json!({ "message": "It's not your turn." }));
                    return;
                }
            }

            let outcome = guard
                .rooms
                .get_mut(room_code)
                .and_then(|room| room.engine.as_mut())
                .expect("validated above")
                .make_move(mover_id, mv.clone());

            if !outcome.valid {
                self.send_to(&guard, mover_id, server_event::INVALID_MOVE, json!({ "message": outcome.message.unwrap_or_default() }));
                return;
            }

            let is_over = guard
                .rooms
                .get(room_code)
                .and_then(|r| r.engine.as_ref())
                .is_some_and(|e| e.is_over());
            let mv_json = serde_json::to_value(&mv).unwrap_or(serde_json::Value::Null);
            let room = guard.rooms.get(room_code).expect("still present");
            self.broadcast_room_state(&guard, room, server_event::MOVE_MADE, json!({ "move": mv_json, "result": outcome.result }));
            if is_over {
                let room = guard.rooms.get(room_code).expect("still present");
                self.broadcast_room_state(&guard, room, server_event::GAME_OVER, json!({}));
            }
        }
        self.schedule_ai_if_needed(room_code);
    }

    pub fn request_state(&self, id: &PlayerId, room_code: String) {
        let guard = self.state.lock().unwrap();
        let Some(room) = guard.rooms.get(&room_code) else { return };
        let game_state = room.engine.as_ref().map(|e| e.get_state(id));
        let payload = json!({ "players": room.seats, "gameState": game_state });
        self.send_to(&guard, id, server_event::STATE_RESPONSE, payload);
    }

    pub fn request_rematch(self: &Arc<Self>, id: &PlayerId, room_code: String) {
        let quorum = {
            let mut guard = self.state.lock().unwrap();
            let Some(room) = guard.rooms.get(&room_code) else { return };
            self.broadcast_room(&guard, room, server_event::REMATCH_REQUESTED, json!({ "playerId": id }));
            let Some(room) = guard.rooms.get_mut(&room_code) else { return };
            let quorum = room.request_rematch(id).unwrap_or(false);
            if quorum {
                let room = guard.rooms.get(&room_code).expect("still present");
                self.broadcast_room_state(&guard, room, server_event::GAME_START, json!({}));
            }
            quorum
        };
        if quorum {
            self.schedule_ai_if_needed(&room_code);
        }
    }

    /// Idempotent: drops the connection, cancels its challenges, and (if it
    /// was seated) removes it from its room, closing the room and notifying
    /// the remaining seats when too few humans are left.
    pub fn disconnect(self: &Arc<Self>, id: &PlayerId) {
        let room_to_recheck = {
            let mut guard = self.state.lock().unwrap();
            guard.connections.remove(id);
            guard.challenges.cancel_for_user(id);
            let mut recheck = None;
            if let Some(room_code) = guard.room_of.remove(id) {
                let closed = if let Some(room) = guard.rooms.get_mut(&room_code) {
                    room.remove(id);
                    room.lifecycle() == RoomLifecycle::Closed
                } else {
                    false
                };
                if closed {
                    if let Some(room) = guard.rooms.get(&room_code) {
                        self.broadcast_room(&guard, room, server_event::OPPONENT_DISCONNECTED, json!({ "playerId": id }));
                    }
                    guard.rooms.remove(&room_code);
                } else if guard.rooms.contains_key(&room_code) {
                    recheck = Some(room_code);
                }
            }
            if let Some(event) = guard.registry.remove(id) {
                self.broadcast_registry_event(&guard, None, event);
            }
            recheck
        };
        if let Some(room_code) = room_to_recheck {
            self.schedule_ai_if_needed(&room_code);
        }
    }

    // ---- challenges -----------------------------------------------------

    pub fn send_challenge(&self, id: &PlayerId, to_id: String, game_type: GameType) {
        let now = self.now();
        let mut guard = self.state.lock().unwrap();
        match guard.challenges.send(id.clone(), to_id.clone(), game_type, now) {
            Ok(challenge) => {
                let payload = json!({
                    "challengeId": challenge.id,
                    "fromId": challenge.from_id,
                    "gameType": challenge.game_type,
                });
                self.send_to(&guard, &to_id, server_event::CHALLENGE_RECEIVED, payload);
            }
            Err(_) => {
                // At most one pending outbound challenge per (fromId, gameType);
                // there's no wire event for this rejection, so the sender just
                // doesn't hear back.
            }
        }
    }

    pub fn accept_challenge(self: &Arc<Self>, id: &PlayerId, challenge_id: String) {
        let mut guard = self.state.lock().unwrap();
        let Ok(challenge) = guard.challenges.accept(&challenge_id, id) else { return };
        let payload = json!({
            "challengeId": challenge.id,
            "fromId": challenge.from_id,
            "toId": challenge.to_id,
            "gameType": challenge.game_type,
        });
        self.send_to(&guard, &challenge.from_id, server_event::CHALLENGE_ACCEPTED, payload.clone());
        self.send_to(&guard, &challenge.to_id, server_event::CHALLENGE_ACCEPTED, payload);
        self.start_challenge_room(&mut guard, &challenge);
    }

    pub fn decline_challenge(&self, id: &PlayerId, challenge_id: String) {
        let mut guard = self.state.lock().unwrap();
        let Ok(challenge) = guard.challenges.decline(&challenge_id, id) else { return };
        self.send_to(&guard, &challenge.from_id, server_event::CHALLENGE_DECLINED, json!({ "challengeId": challenge.id }));
    }

    /// Creates the room both sides of an accepted challenge play in. The
    /// challenger is host; for Poker's lobby mode the room waits for an
    /// explicit `start-game` (so the host can still pick `aiCount`), every
    /// other game starts immediately once both seats are filled.
    fn start_challenge_room(&self, guard: &mut HubState, challenge: &Challenge) {
        let code = tablehub_engine::generate_room_code(|c| guard.rooms.contains_key(c));
        let host_name = guard.registry.get(&challenge.from_id).map(|u| u.name).unwrap_or_else(|| challenge.from_id.clone());
        let guest_name = guard.registry.get(&challenge.to_id).map(|u| u.name).unwrap_or_else(|| challenge.to_id.clone());
        let mut room = Room::new(code.clone(), Seat::human(challenge.from_id.clone(), host_name), challenge.game_type);
        let _ = room.join(Seat::human(challenge.to_id.clone(), guest_name));
        guard.room_of.insert(challenge.from_id.clone(), code.clone());
        guard.room_of.insert(challenge.to_id.clone(), code.clone());
        if let Some(event) = guard.registry.set_status(&challenge.from_id, UserStatus::InGame, Some(code.clone()), Some(challenge.game_type)) {
            self.broadcast_registry_event(guard, None, event);
        }
        if let Some(event) = guard.registry.set_status(&challenge.to_id, UserStatus::InGame, Some(code.clone()), Some(challenge.game_type)) {
            self.broadcast_registry_event(guard, None, event);
        }

        if challenge.game_type.is_lobby_mode() {
            let max_players = room.max_players;
            guard.rooms.insert(code.clone(), room);
            let payload = json!({ "roomCode": code, "maxPlayers": max_players });
            self.send_to(guard, &challenge.from_id, server_event::GAME_LOBBY_READY, payload.clone());
            self.send_to(guard, &challenge.to_id, server_event::GAME_LOBBY_READY, payload);
        } else {
            let mut dummy = 0u64;
            let _ = room.start(0, self.config.default_bot_difficulty, || {
                dummy += 1;
                format!("unused-{dummy}")
            });
            guard.rooms.insert(code.clone(), room);
            let room = guard.rooms.get(&code).expect("just inserted");
            self.broadcast_room_state(guard, room, server_event::GAME_START, json!({}));
        }
    }

    /// Expires stale pending challenges. Spec names no wire event for
    /// expiry; this just drops them, matching §5's cancellation language.
    pub fn sweep_challenges(&self) {
        let now = self.now();
        let mut guard = self.state.lock().unwrap();
        let _ = guard.challenges.sweep_expired(now);
    }

    // ---- AI driver -------------------------------------------------------

    /// Widens the jitter window at higher difficulty.
    fn jitter_delay(&self, difficulty: BotDifficulty) -> Duration {
        let min = self.config.ai_min_delay_ms;
        let max = self.config.ai_max_delay_ms;
        let widened_max = match difficulty {
            BotDifficulty::Easy => max,
            BotDifficulty::Medium => max + (max - min) / 2,
            BotDifficulty::Hard => max + (max - min),
        };
        let delay_ms = rand::rng().random_range(min..=widened_max.max(min));
        Duration::from_millis(delay_ms)
    }

    fn schedule_ai_if_needed(self: &Arc<Self>, room_code: &str) {
        let scheduled = {
            let guard = self.state.lock().unwrap();
            let Some(room) = guard.rooms.get(room_code) else { return };
            let Some(engine) = &room.engine else { return };
            let Some(actor) = engine.current_actor() else { return };
            let Some(seat) = room.seats.iter().find(|s| s.id == actor) else { return };
            if !seat.is_bot() {
                return;
            }
            let difficulty = seat.difficulty.unwrap_or(BotDifficulty::Medium);
            Some((actor, self.jitter_delay(difficulty)))
        };
        let Some((bot_id, delay)) = scheduled else { return };
        let hub = Arc::clone(self);
        let room_code = room_code.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            hub.run_ai_turn(&room_code, &bot_id);
        });
    }

    fn run_ai_turn(self: &Arc<Self>, room_code: &str, bot_id: &str) {
        let mv = {
            let guard = self.state.lock().unwrap();
            let Some(room) = guard.rooms.get(room_code) else { return };
            let Some(engine) = &room.engine else { return };
            if engine.current_actor().as_deref() != Some(bot_id) {
                return;
            }
            let Some(seat) = room.seats.iter().find(|s| s.id == bot_id) else { return };
            let difficulty = seat.difficulty.unwrap_or(BotDifficulty::Medium);
            let params = DifficultyParams::from_difficulty(difficulty);
            let game_state = engine.get_state(bot_id);
            BotDecisionMaker::new().decide(room.game_type, &game_state, bot_id, &params)
        };
        self.apply_move(room_code, &bot_id.to_string(), mv);
    }
}
