//! Process-wide user directory. Pure bookkeeping: the Hub in the server crate owns the
//! actual websocket connections and decides what to do with the events this
//! returns.

use crate::errors::EngineError;
use crate::PlayerId;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserStatus {
    Available,
    InGame,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserSummary {
    pub id: PlayerId,
    pub name: String,
    pub status: UserStatus,
    #[serde(rename = "currentRoom", skip_serializing_if = "Option::is_none")]
    pub current_room: Option<String>,
    #[serde(rename = "gameType", skip_serializing_if = "Option::is_none")]
    pub game_type: Option<crate::game::GameType>,
}

#[derive(Clone, Debug)]
struct User {
    name: String,
    status: UserStatus,
    current_room: Option<String>,
    game_type: Option<crate::game::GameType>,
}

impl User {
    fn summarize(&self, id: &PlayerId) -> UserSummary {
        UserSummary {
            id: id.clone(),
            name: self.name.clone(),
            status: self.status,
            current_room: self.current_room.clone(),
            game_type: self.game_type,
        }
    }
}

/// Directory events the Hub broadcasts to other connections.
#[derive(Clone, Debug)]
pub enum RegistryEvent {
    UserJoined(UserSummary),
    UserLeft(PlayerId),
    UserStatus(UserSummary),
}

/// Names are unique, case-sensitively, among currently-registered users.
#[derive(Clone, Debug, Default)]
pub struct UserRegistry {
    users: HashMap<PlayerId, User>,
}

impl UserRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.users.values().any(|u| u.name == name)
    }

    /// Registers `id` under `name`. Returns the full user-list snapshot the
    /// new connection should receive, plus the `user-joined` event everyone
    /// else gets.
    pub fn add(&mut self, id: PlayerId, name: String) -> Result<(Vec<UserSummary>, RegistryEvent), EngineError> {
        if self.name_taken(&name) {
            return Err(EngineError::NameInUse);
        }
        let user = User { name, status: UserStatus::Available, current_room: None, game_type: None };
        let summary = user.summarize(&id);
        self.users.insert(id, user);
        let snapshot = self.user_list();
        Ok((snapshot, RegistryEvent::UserJoined(summary)))
    }

    /// Idempotent. Returns the `user-left` event if `id` was registered.
    pub fn remove(&mut self, id: &PlayerId) -> Option<RegistryEvent> {
        self.users.remove(id).map(|_| RegistryEvent::UserLeft(id.clone()))
    }

    /// Returns the `user-status` event if `id` was registered.
    pub fn set_status(
        &mut self,
        id: &PlayerId,
        status: UserStatus,
        current_room: Option<String>,
        game_type: Option<crate::game::GameType>,
    ) -> Option<RegistryEvent> {
        let user = self.users.get_mut(id)?;
        user.status = status;
        user.current_room = current_room;
        user.game_type = game_type;
        Some(RegistryEvent::UserStatus(user.summarize(id)))
    }

    #[must_use]
    pub fn user_list(&self) -> Vec<UserSummary> {
        self.users.iter().map(|(id, u)| u.summarize(id)).collect()
    }

    #[must_use]
    pub fn get(&self, id: &PlayerId) -> Option<UserSummary> {
        self.users.get(id).map(|u| u.summarize(id))
    }

    #[must_use]
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.users.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_is_rejected() {
        let mut reg = UserRegistry::new();
        reg.add("a".into(), "Alice".into()).unwrap();
        let err = reg.add("b".into(), "Alice".into()).unwrap_err();
        assert_eq!(err, EngineError::NameInUse);
    }

    #[test]
    fn name_equality_is_case_sensitive() {
        let mut reg = UserRegistry::new();
        reg.add("a".into(), "Alice".into()).unwrap();
        assert!(reg.add("b".into(), "alice".into()).is_ok());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut reg = UserRegistry::new();
        reg.add("a".into(), "Alice".into()).unwrap();
        assert!(reg.remove(&"a".to_string()).is_some());
        assert!(reg.remove(&"a".to_string()).is_none());
    }

    #[test]
    fn add_returns_full_snapshot_including_new_user() {
        let mut reg = UserRegistry::new();
        reg.add("a".into(), "Alice".into()).unwrap();
        let (snapshot, _) = reg.add("b".into(), "Bob".into()).unwrap();
        assert_eq!(snapshot.len(), 2);
    }
}
