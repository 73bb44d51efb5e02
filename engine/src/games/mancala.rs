//! Mancala (Kalah rules): 6 pits + store per side, sowing with
//! extra-turn-on-own-store and capture-on-empty-own-pit.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use serde_json::json;

const PITS_PER_SIDE: usize = 6;
const STORE_0: usize = 6;
const STORE_1: usize = 13;

#[derive(Clone, Debug)]
pub struct MancalaEngine {
    players: Vec<PlayerId>,
    board: [u32; 14],
    turn: usize,
    winner: Option<PlayerId>,
    draw: bool,
}

impl MancalaEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let mut board = [4u32; 14];
        board[STORE_0] = 0;
        board[STORE_1] = 0;
        Self {
            players: player_ids,
            board,
            turn: 0,
            winner: None,
            draw: false,
        }
    }

    fn own_pits(&self, player: usize) -> std::ops::Range<usize> {
        if player == 0 { 0..PITS_PER_SIDE } else { 7..7 + PITS_PER_SIDE }
    }

    fn own_store(&self, player: usize) -> usize {
        if player == 0 { STORE_0 } else { STORE_1 }
    }

    fn opponent_store(&self, player: usize) -> usize {
        if player == 0 { STORE_1 } else { STORE_0 }
    }

    fn side_empty(&self, player: usize) -> bool {
        self.own_pits(player).all(|i| self.board[i] == 0)
    }

    fn settle_if_over(&mut self) {
        for player in 0..2 {
            if self.side_empty(player) {
                let other = 1 - player;
                let collected: u32 = self.own_pits(other).map(|i| self.board[i]).sum();
                for i in self.own_pits(other) {
                    self.board[i] = 0;
                }
                self.board[self.own_store(other)] += collected;
                let s0 = self.board[STORE_0];
                let s1 = self.board[STORE_1];
                self.winner = match s0.cmp(&s1) {
                    std::cmp::Ordering::Greater => self.players.first().cloned(),
                    std::cmp::Ordering::Less => self.players.get(1).cloned(),
                    std::cmp::Ordering::Equal => {
                        self.draw = true;
                        None
                    }
                };
                return;
            }
        }
    }

    fn sow(&mut self, player: usize, pit: usize) -> MoveOutcome {
        if !self.own_pits(player).contains(&pit) {
            return MoveOutcome::invalid("That pit isn't on your side.");
        }
        let stones = self.board[pit];
        if stones == 0 {
            return MoveOutcome::invalid("That pit is empty.");
        }
        self.board[pit] = 0;
        let opponent_store = self.opponent_store(player);
        let mut idx = pit;
        let mut remaining = stones;
        let mut last = idx;
        while remaining > 0 {
            idx = (idx + 1) % 14;
            if idx == opponent_store {
                continue;
            }
            self.board[idx] += 1;
            last = idx;
            remaining -= 1;
        }

        let own_store = self.own_store(player);
        let mut extra_turn = last == own_store;

        if self.own_pits(player).contains(&last) && self.board[last] == 1 {
            let opposite = 12 - last;
            if self.board[opposite] > 0 {
                let captured = self.board[opposite] + 1;
                self.board[opposite] = 0;
                self.board[last] = 0;
                self.board[own_store] += captured;
            }
        }

        self.settle_if_over();
        if self.winner.is_some() || self.draw {
            extra_turn = false;
        }
        if !extra_turn {
            self.turn = 1 - player;
        }
        MoveOutcome::ok(Some(json!({ "extraTurn": extra_turn })))
    }
}

impl GameEngine for MancalaEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.winner.is_some() || self.draw {
            return MoveOutcome::invalid("The game is over.");
        }
        let Move::Sow { pit } = mv else {
            return MoveOutcome::invalid("Not a Mancala move.");
        };
        if self.players.get(self.turn).map(String::as_str) != Some(player_id) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        self.sow(self.turn, pit)
    }

    fn get_state(&self, _viewer_id: &str) -> serde_json::Value {
        json!({
            "board": self.board,
            "currentPlayer": self.players.get(self.turn),
            "winner": self.winner,
            "draw": self.draw,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        if self.players.iter().any(|p| p == player_id) && self.winner.is_none() && !self.draw {
            self.winner = self.players.iter().find(|p| *p != player_id).cloned();
        }
    }

    fn current_actor(&self) -> Option<PlayerId> {
        if self.winner.is_some() || self.draw {
            None
        } else {
            self.players.get(self.turn).cloned()
        }
    }

    fn is_over(&self) -> bool {
        self.winner.is_some() || self.draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sowing_into_own_store_grants_extra_turn() {
        let mut e = MancalaEngine::new(vec!["a".into(), "b".into()]);
        let outcome = e.make_move("a", Move::Sow { pit: 2 });
        assert!(outcome.valid);
        assert_eq!(e.turn, 0);
    }

    #[test]
    fn sowing_elsewhere_passes_turn() {
        let mut e = MancalaEngine::new(vec!["a".into(), "b".into()]);
        e.make_move("a", Move::Sow { pit: 0 });
        assert_eq!(e.turn, 1);
    }

    #[test]
    fn capture_on_empty_own_pit() {
        let mut e = MancalaEngine::new(vec!["a".into(), "b".into()]);
        e.board = [0; 14];
        e.board[2] = 1;
        e.board[9] = 5;
        e.sow(0, 2);
        assert_eq!(e.board[3], 0);
        assert_eq!(e.board[9], 0);
        assert_eq!(e.board[STORE_0], 6);
    }

    #[test]
    fn empty_side_sweeps_remaining_stones() {
        let mut e = MancalaEngine::new(vec!["a".into(), "b".into()]);
        e.board = [0; 14];
        e.board[0] = 1;
        e.board[7] = 3;
        e.sow(0, 0);
        assert!(e.winner.is_some() || e.draw);
    }
}
