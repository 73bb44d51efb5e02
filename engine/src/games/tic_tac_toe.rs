//! Tic-Tac-Toe: 2-player, 3x3 board, cell placements.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use serde_json::json;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mark {
    X,
    O,
}

#[derive(Clone, Debug)]
pub struct TicTacToeEngine {
    players: Vec<PlayerId>,
    board: [[Option<Mark>; 3]; 3],
    turn: usize,
    winner: Option<PlayerId>,
    draw: bool,
}

impl TicTacToeEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        Self {
            players: player_ids,
            board: [[None; 3]; 3],
            turn: 0,
            winner: None,
            draw: false,
        }
    }

    fn mark_for(&self, idx: usize) -> Mark {
        if idx == 0 { Mark::X } else { Mark::O }
    }

    fn check_winner(&self) -> bool {
        let b = &self.board;
        let lines = [
            [(0, 0), (0, 1), (0, 2)],
            [(1, 0), (1, 1), (1, 2)],
            [(2, 0), (2, 1), (2, 2)],
            [(0, 0), (1, 0), (2, 0)],
            [(0, 1), (1, 1), (2, 1)],
            [(0, 2), (1, 2), (2, 2)],
            [(0, 0), (1, 1), (2, 2)],
            [(0, 2), (1, 1), (2, 0)],
        ];
        lines.iter().any(|line| {
            let vals: Vec<Option<Mark>> = line.iter().map(|&(r, c)| b[r][c]).collect();
            vals[0].is_some() && vals[0] == vals[1] && vals[1] == vals[2]
        })
    }

    fn board_full(&self) -> bool {
        self.board.iter().flatten().all(Option::is_some)
    }
}

impl GameEngine for TicTacToeEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.winner.is_some() || self.draw {
            return MoveOutcome::invalid("The game is over.");
        }
        let Move::PlaceMark { row, col } = mv else {
            return MoveOutcome::invalid("Not a Tic-Tac-Toe move.");
        };
        if self.players.get(self.turn).map(String::as_str) != Some(player_id) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        if row >= 3 || col >= 3 {
            return MoveOutcome::invalid("Cell out of bounds.");
        }
        if self.board[row][col].is_some() {
            return MoveOutcome::invalid("That cell is already taken.");
        }
        self.board[row][col] = Some(self.mark_for(self.turn));
        if self.check_winner() {
            self.winner = self.players.get(self.turn).cloned();
        } else if self.board_full() {
            self.draw = true;
        } else {
            self.turn = 1 - self.turn;
        }
        MoveOutcome::ok(Some(json!({ "row": row, "col": col })))
    }

    fn get_state(&self, _viewer_id: &str) -> serde_json::Value {
        let board: Vec<Vec<Option<&'static str>>> = self
            .board
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.map(|m| match m {
                            Mark::X => "X",
                            Mark::O => "O",
                        })
                    })
                    .collect()
            })
            .collect();
        json!({
            "board": board,
            "currentPlayer": self.players.get(self.turn),
            "winner": self.winner,
            "draw": self.draw,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        if let Some(pos) = self.players.iter().position(|p| p == player_id) {
            if self.winner.is_none() && !self.draw {
                self.winner = self.players.iter().find(|p| *p != player_id).cloned();
            }
            let _ = pos;
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
    fn top_row_wins_for_mover() {
        let mut e = TicTacToeEngine::new(vec!["a".into(), "b".into()]);
        e.make_move("a", Move::PlaceMark { row: 0, col: 0 });
        e.make_move("b", Move::PlaceMark { row: 1, col: 0 });
        e.make_move("a", Move::PlaceMark { row: 0, col: 1 });
        e.make_move("b", Move::PlaceMark { row: 1, col: 1 });
        e.make_move("a", Move::PlaceMark { row: 0, col: 2 });
        assert_eq!(e.winner, Some("a".to_string()));
    }

    #[test]
    fn rejects_out_of_turn() {
        let mut e = TicTacToeEngine::new(vec!["a".into(), "b".into()]);
        let outcome = e.make_move("b", Move::PlaceMark { row: 0, col: 0 });
        assert!(!outcome.valid);
    }

    #[test]
    fn rejects_occupied_cell() {
        let mut e = TicTacToeEngine::new(vec!["a".into(), "b".into()]);
        e.make_move("a", Move::PlaceMark { row: 0, col: 0 });
        let outcome = e.make_move("b", Move::PlaceMark { row: 0, col: 0 });
        assert!(!outcome.valid);
    }

    #[test]
    fn disconnect_hands_win_to_opponent() {
        let mut e = TicTacToeEngine::new(vec!["a".into(), "b".into()]);
        e.remove_player("a");
        assert_eq!(e.winner, Some("b".to_string()));
    }
}
