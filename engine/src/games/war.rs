//! War: two 26-card decks, simultaneous flips, recursive ties.

use crate::cards::{Card, Deck, Suit};
use crate::game::{GameEngine, Move, MoveOutcome};
use crate::errors::EngineError;
use crate::PlayerId;
use serde_json::json;
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct WarEngine {
    players: Vec<PlayerId>,
    decks: [VecDeque<Card>; 2],
    last_flip: Option<(Card, Card)>,
    winner: Option<PlayerId>,
}

impl WarEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let mut deck = Deck::standard();
        deck.shuffle();
        let mut a = VecDeque::new();
        let mut b = VecDeque::new();
        let mut toggle = true;
        while let Some(card) = deck.deal() {
            if toggle {
                a.push_back(card);
            } else {
                b.push_back(card);
            }
            toggle = !toggle;
        }
        Self {
            players: player_ids,
            decks: [a, b],
            last_flip: None,
            winner: None,
        }
    }

    fn index_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player_id)
    }

    /// War's rank for comparison: aces are already stored high (14) by `Deck`.
    fn rank(card: Card) -> u8 {
        card.value
    }

    fn play_round(&mut self) -> Result<(Vec<Card>, usize), EngineError> {
        let mut pile = Vec::new();
        let Some(top0) = self.decks[0].pop_front() else {
            return Err(EngineError::InsufficientCards);
        };
        let Some(top1) = self.decks[1].pop_front() else {
            self.decks[0].push_front(top0);
            return Err(EngineError::InsufficientCards);
        };
        self.last_flip = Some((top0, top1));
        pile.push(top0);
        pile.push(top1);

        match Self::rank(top0).cmp(&Self::rank(top1)) {
            std::cmp::Ordering::Greater => Ok((pile, 0)),
            std::cmp::Ordering::Less => Ok((pile, 1)),
            std::cmp::Ordering::Equal => {
                for side in 0..2 {
                    let take = self.decks[side].len().min(3);
                    for _ in 0..take {
                        if let Some(c) = self.decks[side].pop_front() {
                            pile.push(c);
                        }
                    }
                }
                if self.decks[0].is_empty() {
                    return Ok((pile, 1));
                }
                if self.decks[1].is_empty() {
                    return Ok((pile, 0));
                }
                let (mut war_pile, winner) = self.play_round()?;
                pile.append(&mut war_pile);
                Ok((pile, winner))
            }
        }
    }

    fn flip(&mut self) -> MoveOutcome {
        match self.play_round() {
            Ok((pile, winner)) => {
                for card in pile {
                    self.decks[winner].push_back(card);
                }
                if self.decks[1 - winner].is_empty() {
                    self.winner = self.players.get(winner).cloned();
                }
                MoveOutcome::ok(Some(json!({
                    "flip": self.last_flip.map(|(a, b)| (a.to_view(false), b.to_view(false))),
                    "roundWinner": winner,
                })))
            }
            Err(e) => MoveOutcome::invalid(e.to_string()),
        }
    }
}

impl GameEngine for WarEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.winner.is_some() {
            return MoveOutcome::invalid("The game is over.");
        }
        if self.index_of(player_id).is_none() {
            return MoveOutcome::invalid("Unknown player.");
        }
        match mv {
            Move::Flip => self.flip(),
            _ => MoveOutcome::invalid("Not a War move."),
        }
    }

    fn get_state(&self, viewer_id: &str) -> serde_json::Value {
        let idx = self.index_of(viewer_id);
        json!({
            "deckSizes": [self.decks[0].len(), self.decks[1].len()],
            "lastFlip": self.last_flip.map(|(a, b)| (a.to_view(false), b.to_view(false))),
            "winner": self.winner,
            "you": idx,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        if let Some(idx) = self.index_of(player_id) {
            if self.winner.is_none() {
                self.winner = self.players.get(1 - idx).cloned();
            }
        }
    }

    fn current_actor(&self) -> Option<PlayerId> {
        if self.winner.is_some() {
            None
        } else {
            self.players.first().cloned()
        }
    }

    fn is_over(&self) -> bool {
        self.winner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decks_start_at_26_cards_each() {
        let e = WarEngine::new(vec!["a".into(), "b".into()]);
        assert_eq!(e.decks[0].len() + e.decks[1].len(), 52);
    }

    #[test]
    fn higher_card_wins_both() {
        let mut e = WarEngine::new(vec!["a".into(), "b".into()]);
        e.decks[0] = VecDeque::from(vec![Card::new(10, Suit::Clubs)]);
        e.decks[1] = VecDeque::from(vec![Card::new(3, Suit::Hearts)]);
        let before_a = e.decks[0].len();
        let before_b = e.decks[1].len();
        e.flip();
        assert_eq!(e.decks[0].len(), before_a + before_b);
        assert!(e.decks[1].is_empty());
    }

    #[test]
    fn empty_opponent_deck_ends_game() {
        let mut e = WarEngine::new(vec!["a".into(), "b".into()]);
        e.decks[0] = VecDeque::from(vec![Card::new(10, Suit::Clubs)]);
        e.decks[1] = VecDeque::from(vec![Card::new(3, Suit::Hearts)]);
        e.flip();
        assert_eq!(e.winner, Some("a".to_string()));
    }
}
