//! Direct challenges between two registered users. TTL expiry is a pure `is_expired(now)` check;
//! the server crate owns the clock and calls `sweep_expired` on a timer.

use crate::game::GameType;
use crate::PlayerId;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeState {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Clone, Debug, Serialize)]
pub struct Challenge {
    pub id: String,
    #[serde(rename = "fromId")]
    pub from_id: PlayerId,
    #[serde(rename = "toId")]
    pub to_id: PlayerId,
    #[serde(rename = "gameType")]
    pub game_type: GameType,
    pub state: ChallengeState,
    /// Seconds elapsed since creation, stamped by the caller (this crate has
    /// no clock of its own) each time expiry is checked.
    #[serde(skip)]
    created_at: Duration,
}

impl Challenge {
    fn is_expired(&self, now: Duration, ttl: Duration) -> bool {
        now.saturating_sub(self.created_at) >= ttl
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum ChallengeError {
    AlreadyPending,
    NotFound,
    NotRecipient,
}

/// At most one pending outbound challenge per `(fromId, gameType)`.
#[derive(Clone, Debug, Default)]
pub struct ChallengeService {
    challenges: HashMap<String, Challenge>,
    next_id: u64,
    ttl: Duration,
}

impl ChallengeService {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { challenges: HashMap::new(), next_id: 0, ttl }
    }

    fn has_pending_outbound(&self, from_id: &PlayerId, game_type: GameType) -> bool {
        self.challenges
            .values()
            .any(|c| c.from_id == *from_id && c.game_type == game_type && c.state == ChallengeState::Pending)
    }

    /// `now` is the caller's monotonic clock reading, stamped onto the
    /// challenge so `sweep_expired` can later judge its age without this
    /// crate touching wall-clock time itself.
    pub fn send(
        &mut self,
        from_id: PlayerId,
        to_id: PlayerId,
        game_type: GameType,
        now: Duration,
    ) -> Result<Challenge, ChallengeError> {
        if self.has_pending_outbound(&from_id, game_type) {
            return Err(ChallengeError::AlreadyPending);
        }
        self.next_id += 1;
        let id = format!("ch-{}", self.next_id);
        let challenge = Challenge {
            id: id.clone(),
            from_id,
            to_id,
            game_type,
            state: ChallengeState::Pending,
            created_at: now,
        };
        self.challenges.insert(id, challenge.clone());
        Ok(challenge)
    }

    pub fn accept(&mut self, id: &str, accepting_user: &PlayerId) -> Result<Challenge, ChallengeError> {
        let challenge = self.challenges.get_mut(id).ok_or(ChallengeError::NotFound)?;
        if challenge.to_id != *accepting_user {
            return Err(ChallengeError::NotRecipient);
        }
        if challenge.state != ChallengeState::Pending {
            return Err(ChallengeError::NotFound);
        }
        challenge.state = ChallengeState::Accepted;
        Ok(challenge.clone())
    }

    pub fn decline(&mut self, id: &str, declining_user: &PlayerId) -> Result<Challenge, ChallengeError> {
        let challenge = self.challenges.get_mut(id).ok_or(ChallengeError::NotFound)?;
        if challenge.to_id != *declining_user {
            return Err(ChallengeError::NotRecipient);
        }
        challenge.state = ChallengeState::Declined;
        Ok(challenge.clone())
    }

    /// Drops every challenge touching `user_id` (disconnects cancel both
    /// inbound and outbound challenges).
    pub fn cancel_for_user(&mut self, user_id: &PlayerId) {
        self.challenges.retain(|_, c| c.from_id != *user_id && c.to_id != *user_id);
    }

    /// Marks every still-pending challenge older than the configured TTL as
    /// expired and returns them for the Hub to notify both parties about.
    pub fn sweep_expired(&mut self, now: Duration) -> Vec<Challenge> {
        let ttl = self.ttl;
        let mut expired = Vec::new();
        for challenge in self.challenges.values_mut() {
            if challenge.state == ChallengeState::Pending && challenge.is_expired(now, ttl) {
                challenge.state = ChallengeState::Expired;
                expired.push(challenge.clone());
            }
        }
        expired
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Challenge> {
        self.challenges.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_outbound_challenge_for_same_game_is_rejected() {
        let mut svc = ChallengeService::new(DEFAULT_TTL);
        svc.send("a".into(), "b".into(), GameType::Checkers, Duration::ZERO).unwrap();
        let err = svc.send("a".into(), "c".into(), GameType::Checkers, Duration::ZERO).unwrap_err();
        assert_eq!(err, ChallengeError::AlreadyPending);
    }

    #[test]
    fn distinct_game_types_do_not_collide() {
        let mut svc = ChallengeService::new(DEFAULT_TTL);
        svc.send("a".into(), "b".into(), GameType::Checkers, Duration::ZERO).unwrap();
        assert!(svc.send("a".into(), "c".into(), GameType::War, Duration::ZERO).is_ok());
    }

    #[test]
    fn only_the_recipient_can_accept() {
        let mut svc = ChallengeService::new(DEFAULT_TTL);
        let challenge = svc.send("a".into(), "b".into(), GameType::War, Duration::ZERO).unwrap();
        let err = svc.accept(&challenge.id, &"a".to_string()).unwrap_err();
        assert_eq!(err, ChallengeError::NotRecipient);
        assert!(svc.accept(&challenge.id, &"b".to_string()).is_ok());
    }

    #[test]
    fn sweep_expires_only_after_ttl() {
        let mut svc = ChallengeService::new(Duration::from_secs(30));
        svc.send("a".into(), "b".into(), GameType::War, Duration::ZERO).unwrap();
        assert!(svc.sweep_expired(Duration::from_secs(10)).is_empty());
        let expired = svc.sweep_expired(Duration::from_secs(31));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].state, ChallengeState::Expired);
    }

    #[test]
    fn cancel_for_user_drops_both_directions() {
        let mut svc = ChallengeService::new(DEFAULT_TTL);
        svc.send("a".into(), "b".into(), GameType::War, Duration::ZERO).unwrap();
        svc.send("c".into(), "a".into(), GameType::Checkers, Duration::ZERO).unwrap();
        svc.cancel_for_user(&"a".to_string());
        assert!(svc.challenges.is_empty());
    }
}
