//! Battleship: setup (ship placement) then alternating-shot battle phase,
//! with ships hidden until sunk.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use serde_json::json;

const BOARD_SIZE: usize = 10;
const FLEET: [usize; 5] = [5, 4, 3, 3, 2];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Setup,
    Battle,
    Over,
}

#[derive(Clone, Debug)]
struct Ship {
    cells: Vec<(usize, usize)>,
    hits: Vec<(usize, usize)>,
}

impl Ship {
    fn is_sunk(&self) -> bool {
        self.cells.iter().all(|c| self.hits.contains(c))
    }
}

#[derive(Clone, Debug, Default)]
struct Board {
    ships: Vec<Ship>,
    confirmed: bool,
    shots_made: Vec<((usize, usize), bool)>,
}

#[derive(Clone, Debug)]
pub struct BattleshipEngine {
    players: Vec<PlayerId>,
    boards: [Board; 2],
    phase: Phase,
    turn: usize,
    winner: Option<PlayerId>,
}

impl BattleshipEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        Self {
            players: player_ids,
            boards: [Board::default(), Board::default()],
            phase: Phase::Setup,
            turn: 0,
            winner: None,
        }
    }

    fn index_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player_id)
    }

    fn place_ship(&mut self, idx: usize, row: usize, col: usize, length: usize, horizontal: bool) -> MoveOutcome {
        if self.boards[idx].ships.len() >= FLEET.len() {
            return MoveOutcome::invalid("All ships already placed.");
        }
        let expected = FLEET[self.boards[idx].ships.len()];
        if length != expected {
            return MoveOutcome::invalid(format!("Next ship must be length {expected}."));
        }
        let cells: Vec<(usize, usize)> = (0..length)
            .map(|i| if horizontal { (row, col + i) } else { (row + i, col) })
            .collect();
        if cells.iter().any(|&(r, c)| r >= BOARD_SIZE || c >= BOARD_SIZE) {
            return MoveOutcome::invalid("Ship out of bounds.");
        }
        if self.boards[idx]
            .ships
            .iter()
            .any(|s| s.cells.iter().any(|c| cells.contains(c)))
        {
            return MoveOutcome::invalid("Ships cannot overlap.");
        }
        self.boards[idx].ships.push(Ship { cells, hits: Vec::new() });
        MoveOutcome::ok(None)
    }

    fn confirm_setup(&mut self, idx: usize) -> MoveOutcome {
        if self.boards[idx].ships.len() != FLEET.len() {
            return MoveOutcome::invalid("All ships must be placed");
        }
        self.boards[idx].confirmed = true;
        if self.boards.iter().all(|b| b.confirmed) {
            self.phase = Phase::Battle;
        }
        MoveOutcome::ok(None)
    }

    fn shoot(&mut self, shooter_idx: usize, row: usize, col: usize) -> MoveOutcome {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return MoveOutcome::invalid("Shot out of bounds.");
        }
        let target_idx = 1 - shooter_idx;
        if self.boards[shooter_idx]
            .shots_made
            .iter()
            .any(|(pos, _)| *pos == (row, col))
        {
            return MoveOutcome::invalid("Already shot there.");
        }
        let mut hit = false;
        for ship in &mut self.boards[target_idx].ships {
            if ship.cells.contains(&(row, col)) && !ship.hits.contains(&(row, col)) {
                ship.hits.push((row, col));
                hit = true;
                break;
            }
        }
        self.boards[shooter_idx].shots_made.push(((row, col), hit));

        let fleet_sunk = self.boards[target_idx].ships.iter().all(Ship::is_sunk);
        if fleet_sunk {
            self.phase = Phase::Over;
            self.winner = self.players.get(shooter_idx).cloned();
        } else if !hit {
            self.turn = target_idx;
        }
        MoveOutcome::ok(Some(json!({ "hit": hit })))
    }
}

impl GameEngine for BattleshipEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        let Some(idx) = self.index_of(player_id) else {
            return MoveOutcome::invalid("Unknown player.");
        };
        match mv {
            Move::PlaceShip { row, col, length, horizontal } => {
                if self.phase != Phase::Setup {
                    return MoveOutcome::invalid("Ships can only be placed during setup.");
                }
                self.place_ship(idx, row, col, length, horizontal)
            }
            Move::ConfirmSetup => {
                if self.phase != Phase::Setup {
                    return MoveOutcome::invalid("Setup is already complete.");
                }
                self.confirm_setup(idx)
            }
            Move::Shoot { row, col } => {
                if self.phase != Phase::Battle {
                    return MoveOutcome::invalid("The battle hasn't started yet.");
                }
                if idx != self.turn {
                    return MoveOutcome::invalid("It's not your turn.");
                }
                self.shoot(idx, row, col)
            }
            _ => MoveOutcome::invalid("Not a Battleship move."),
        }
    }

    fn get_state(&self, viewer_id: &str) -> serde_json::Value {
        let Some(idx) = self.index_of(viewer_id) else {
            return json!({ "phase": "unknown" });
        };
        let opponent_idx = 1 - idx;
        let own_ships: Vec<_> = self.boards[idx]
            .ships
            .iter()
            .map(|s| json!({ "cells": s.cells, "hits": s.hits, "sunk": s.is_sunk() }))
            .collect();
        let opponent_sunk: Vec<_> = self.boards[opponent_idx]
            .ships
            .iter()
            .filter(|s| s.is_sunk())
            .map(|s| json!({ "cells": s.cells }))
            .collect();
        let tracking_grid: Vec<_> = self.boards[idx]
            .shots_made
            .iter()
            .map(|(pos, hit)| json!({ "row": pos.0, "col": pos.1, "hit": hit }))
            .collect();
        json!({
            "phase": match self.phase { Phase::Setup => "setup", Phase::Battle => "battle", Phase::Over => "over" },
            "ownShips": own_ships,
            "opponentSunkShips": opponent_sunk,
            "trackingGrid": tracking_grid,
            "currentPlayer": self.players.get(self.turn),
            "winner": self.winner,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        if self.index_of(player_id).is_some() && self.winner.is_none() {
            self.phase = Phase::Over;
            self.winner = self.players.iter().find(|p| *p != player_id).cloned();
        }
    }

    fn current_actor(&self) -> Option<PlayerId> {
        if self.phase == Phase::Battle {
            self.players.get(self.turn).cloned()
        } else {
            None
        }
    }

    fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_before_all_ships_placed_is_rejected() {
        let mut e = BattleshipEngine::new(vec!["a".into(), "b".into()]);
        let outcome = e.make_move("a", Move::ConfirmSetup);
        assert!(!outcome.valid);
        assert_eq!(outcome.message.as_deref(), Some("All ships must be placed"));
        assert_eq!(e.phase, Phase::Setup);
    }

    #[test]
    fn overlapping_ships_rejected() {
        let mut e = BattleshipEngine::new(vec!["a".into(), "b".into()]);
        e.make_move("a", Move::PlaceShip { row: 0, col: 0, length: 5, horizontal: true });
        let outcome = e.make_move("a", Move::PlaceShip { row: 0, col: 2, length: 4, horizontal: false });
        assert!(!outcome.valid);
    }

    #[test]
    fn full_fleet_and_confirm_starts_battle_once_both_ready() {
        let mut e = BattleshipEngine::new(vec!["a".into(), "b".into()]);
        place_fleet(&mut e, "a");
        place_fleet(&mut e, "b");
        e.make_move("a", Move::ConfirmSetup);
        assert_eq!(e.phase, Phase::Setup);
        e.make_move("b", Move::ConfirmSetup);
        assert_eq!(e.phase, Phase::Battle);
    }

    fn place_fleet(e: &mut BattleshipEngine, player: &str) {
        let mut row = 0;
        for &len in &FLEET {
            e.make_move(player, Move::PlaceShip { row, col: 0, length: len, horizontal: true });
            row += 1;
        }
    }

    #[test]
    fn sinking_fleet_reveals_ship_and_ends_game() {
        let mut e = BattleshipEngine::new(vec!["a".into(), "b".into()]);
        e.boards[1].ships.push(Ship { cells: vec![(0, 0)], hits: Vec::new() });
        e.phase = Phase::Battle;
        e.turn = 0;
        let outcome = e.shoot(0, 0, 0);
        assert!(outcome.valid);
        assert!(e.boards[1].ships[0].is_sunk());
    }
}
