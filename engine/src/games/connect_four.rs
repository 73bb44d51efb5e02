//! Connect-Four: 2-player, 7x6 gravity-drop board.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use serde_json::json;

const COLS: usize = 7;
const ROWS: usize = 6;

#[derive(Clone, Debug)]
pub struct ConnectFourEngine {
    players: Vec<PlayerId>,
    // board[col] is a stack; index 0 is the bottom-most disc.
    board: [Vec<usize>; COLS],
    turn: usize,
    winner: Option<PlayerId>,
    draw: bool,
}

impl ConnectFourEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        Self {
            players: player_ids,
            board: Default::default(),
            turn: 0,
            winner: None,
            draw: false,
        }
    }

    fn grid(&self) -> [[Option<usize>; COLS]; ROWS] {
        let mut grid = [[None; COLS]; ROWS];
        for (c, stack) in self.board.iter().enumerate() {
            for (r, &owner) in stack.iter().enumerate() {
                grid[r][c] = Some(owner);
            }
        }
        grid
    }

    fn check_winner_at(&self, col: usize) -> bool {
        let grid = self.grid();
        let row = self.board[col].len() - 1;
        let owner = grid[row][col];
        let directions = [(0i32, 1i32), (1, 0), (1, 1), (1, -1)];
        for (dr, dc) in directions {
            let mut count = 1;
            for sign in [-1i32, 1] {
                let mut r = row as i32 + dr * sign;
                let mut c = col as i32 + dc * sign;
                while r >= 0 && r < ROWS as i32 && c >= 0 && c < COLS as i32 {
                    if grid[r as usize][c as usize] == owner {
                        count += 1;
                        r += dr * sign;
                        c += dc * sign;
                    } else {
                        break;
                    }
                }
            }
            if count >= 4 {
                return true;
            }
        }
        false
    }
}

impl GameEngine for ConnectFourEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.winner.is_some() || self.draw {
            return MoveOutcome::invalid("The game is over.");
        }
        let Move::DropDisc { col } = mv else {
            return MoveOutcome::invalid("Not a Connect-Four move.");
        };
        if self.players.get(self.turn).map(String::as_str) != Some(player_id) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        if col >= COLS {
            return MoveOutcome::invalid("Column out of bounds.");
        }
        if self.board[col].len() >= ROWS {
            return MoveOutcome::invalid("That column is full.");
        }
        self.board[col].push(self.turn);
        if self.check_winner_at(col) {
            self.winner = self.players.get(self.turn).cloned();
        } else if self.board.iter().all(|c| c.len() == ROWS) {
            self.draw = true;
        } else {
            self.turn = 1 - self.turn;
        }
        MoveOutcome::ok(Some(json!({ "col": col })))
    }

    fn get_state(&self, _viewer_id: &str) -> serde_json::Value {
        let grid: Vec<Vec<Option<usize>>> = self
            .grid()
            .iter()
            .map(|row| row.to_vec())
            .collect();
        json!({
            "board": grid,
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
    fn vertical_four_wins() {
        let mut e = ConnectFourEngine::new(vec!["a".into(), "b".into()]);
        for _ in 0..3 {
            e.make_move("a", Move::DropDisc { col: 0 });
            e.make_move("b", Move::DropDisc { col: 1 });
        }
        e.make_move("a", Move::DropDisc { col: 0 });
        assert_eq!(e.winner, Some("a".to_string()));
    }

    #[test]
    fn full_column_rejected() {
        let mut e = ConnectFourEngine::new(vec!["a".into(), "b".into()]);
        for i in 0..ROWS {
            let player = if i % 2 == 0 { "a" } else { "b" };
            e.make_move(player, Move::DropDisc { col: 3 });
        }
        let outcome = e.make_move("a", Move::DropDisc { col: 3 });
        assert!(!outcome.valid);
    }
}
