//! Checkers: 8x8 board, mandatory captures, chain jumps, king promotion
//!.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use serde_json::json;

const SIZE: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Piece {
    owner: usize,
    king: bool,
}

#[derive(Clone, Debug)]
pub struct CheckersEngine {
    players: Vec<PlayerId>,
    board: [[Option<Piece>; SIZE]; SIZE],
    turn: usize,
    /// Set mid-chain-capture: only this piece may move next.
    forced_piece: Option<(usize, usize)>,
    winner: Option<PlayerId>,
}

impl CheckersEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let mut board = [[None; SIZE]; SIZE];
        for row in 0..3 {
            for col in 0..SIZE {
                if (row + col) % 2 == 1 {
                    board[row][col] = Some(Piece { owner: 0, king: false });
                }
            }
        }
        for row in SIZE - 3..SIZE {
            for col in 0..SIZE {
                if (row + col) % 2 == 1 {
                    board[row][col] = Some(Piece { owner: 1, king: false });
                }
            }
        }
        Self {
            players: player_ids,
            board,
            turn: 0,
            forced_piece: None,
            winner: None,
        }
    }

    fn forward_dirs(&self, piece: Piece) -> Vec<i32> {
        if piece.king {
            vec![-1, 1]
        } else if piece.owner == 0 {
            vec![1]
        } else {
            vec![-1]
        }
    }

    fn capture_from(&self, row: usize, col: usize) -> Vec<(usize, usize, usize, usize)> {
        let Some(piece) = self.board[row][col] else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for dr in self.forward_dirs(piece) {
            for dc in [-1i32, 1] {
                let mid_r = row as i32 + dr;
                let mid_c = col as i32 + dc;
                let to_r = row as i32 + 2 * dr;
                let to_c = col as i32 + 2 * dc;
                if !(0..SIZE as i32).contains(&to_r) || !(0..SIZE as i32).contains(&to_c) {
                    continue;
                }
                let mid = self.board[mid_r as usize][mid_c as usize];
                let target = self.board[to_r as usize][to_c as usize];
                if let Some(mid_piece) = mid {
                    if mid_piece.owner != piece.owner && target.is_none() {
                        out.push((row, col, to_r as usize, to_c as usize));
                    }
                }
            }
        }
        out
    }

    fn any_capture_available(&self, player: usize) -> bool {
        for row in 0..SIZE {
            for col in 0..SIZE {
                if let Some(p) = self.board[row][col] {
                    if p.owner == player && !self.capture_from(row, col).is_empty() {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn any_move_available(&self, player: usize) -> bool {
        if self.any_capture_available(player) {
            return true;
        }
        for row in 0..SIZE {
            for col in 0..SIZE {
                if let Some(p) = self.board[row][col] {
                    if p.owner != player {
                        continue;
                    }
                    for dr in self.forward_dirs(p) {
                        for dc in [-1i32, 1] {
                            let r = row as i32 + dr;
                            let c = col as i32 + dc;
                            if (0..SIZE as i32).contains(&r)
                                && (0..SIZE as i32).contains(&c)
                                && self.board[r as usize][c as usize].is_none()
                            {
                                return true;
                            }
                        }
                    }
                }
            }
        }
        false
    }

    fn maybe_promote(&mut self, row: usize, col: usize) {
        if let Some(p) = &mut self.board[row][col] {
            if (p.owner == 0 && row == SIZE - 1) || (p.owner == 1 && row == 0) {
                p.king = true;
            }
        }
    }

    fn finish_turn_or_chain(&mut self, to_row: usize, to_col: usize, was_capture: bool) {
        if was_capture && !self.capture_from(to_row, to_col).is_empty() {
            self.forced_piece = Some((to_row, to_col));
            return;
        }
        self.forced_piece = None;
        self.turn = 1 - self.turn;
        let opponent = self.turn;
        if !self.any_move_available(opponent) {
            self.winner = self.players.get(1 - opponent).cloned();
        }
    }
}

impl GameEngine for CheckersEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.winner.is_some() {
            return MoveOutcome::invalid("The game is over.");
        }
        let Move::MovePiece { from_row, from_col, to_row, to_col } = mv else {
            return MoveOutcome::invalid("Not a Checkers move.");
        };
        if self.players.get(self.turn).map(String::as_str) != Some(player_id) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        if let Some(forced) = self.forced_piece {
            if forced != (from_row, from_col) {
                return MoveOutcome::invalid("You must continue capturing with the same piece.");
            }
        }
        if from_row >= SIZE || from_col >= SIZE || to_row >= SIZE || to_col >= SIZE {
            return MoveOutcome::invalid("Move out of bounds.");
        }
        let Some(piece) = self.board[from_row][from_col] else {
            return MoveOutcome::invalid("No piece there.");
        };
        if piece.owner != self.turn {
            return MoveOutcome::invalid("That's not your piece.");
        }
        if self.board[to_row][to_col].is_some() {
            return MoveOutcome::invalid("Destination is occupied.");
        }

        let row_delta = to_row as i32 - from_row as i32;
        let col_delta = (to_col as i32 - from_col as i32).abs();
        let must_capture = self.any_capture_available(self.turn);

        if row_delta.abs() == 2 && col_delta == 2 {
            let mid_row = ((from_row as i32 + to_row as i32) / 2) as usize;
            let mid_col = ((from_col as i32 + to_col as i32) / 2) as usize;
            let Some(mid_piece) = self.board[mid_row][mid_col] else {
                return MoveOutcome::invalid("No piece to capture.");
            };
            if mid_piece.owner == piece.owner {
                return MoveOutcome::invalid("Cannot capture your own piece.");
            }
            if !self.forward_dirs(piece).contains(&(row_delta / 2)) {
                return MoveOutcome::invalid("That piece can't move that direction.");
            }
            self.board[mid_row][mid_col] = None;
            self.board[to_row][to_col] = Some(piece);
            self.board[from_row][from_col] = None;
            self.maybe_promote(to_row, to_col);
            self.finish_turn_or_chain(to_row, to_col, true);
            MoveOutcome::ok(Some(json!({ "captured": [mid_row, mid_col] })))
        } else if row_delta.abs() == 1 && col_delta == 1 {
            if must_capture {
                return MoveOutcome::invalid("Capture is mandatory.");
            }
            if !self.forward_dirs(piece).contains(&row_delta) {
                return MoveOutcome::invalid("That piece can't move that direction.");
            }
            self.board[to_row][to_col] = Some(piece);
            self.board[from_row][from_col] = None;
            self.maybe_promote(to_row, to_col);
            self.finish_turn_or_chain(to_row, to_col, false);
            MoveOutcome::ok(None)
        } else {
            MoveOutcome::invalid("Illegal move shape.")
        }
    }

    fn get_state(&self, _viewer_id: &str) -> serde_json::Value {
        let board: Vec<Vec<Option<serde_json::Value>>> = self
            .board
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|p| json!({ "owner": p.owner, "king": p.king })))
                    .collect()
            })
            .collect();
        json!({
            "board": board,
            "currentPlayer": self.players.get(self.turn),
            "forcedPiece": self.forced_piece,
            "winner": self.winner,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        if self.players.iter().any(|p| p == player_id) && self.winner.is_none() {
            self.winner = self.players.iter().find(|p| *p != player_id).cloned();
        }
    }

    fn current_actor(&self) -> Option<PlayerId> {
        if self.winner.is_some() {
            None
        } else {
            self.players.get(self.turn).cloned()
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
    fn simple_forward_move_succeeds() {
        let mut e = CheckersEngine::new(vec!["a".into(), "b".into()]);
        let outcome = e.make_move("a", Move::MovePiece { from_row: 2, from_col: 1, to_row: 3, to_col: 2 });
        assert!(outcome.valid);
    }

    #[test]
    fn mandatory_capture_blocks_simple_move() {
        let mut e = CheckersEngine::new(vec!["a".into(), "b".into()]);
        e.board = [[None; SIZE]; SIZE];
        e.board[2][2] = Some(Piece { owner: 0, king: false });
        e.board[3][3] = Some(Piece { owner: 1, king: false });
        e.board[4][0] = Some(Piece { owner: 0, king: false });
        let outcome = e.make_move("a", Move::MovePiece { from_row: 4, from_col: 0, to_row: 5, to_col: 1 });
        assert!(!outcome.valid);
    }

    #[test]
    fn capture_removes_jumped_piece() {
        let mut e = CheckersEngine::new(vec!["a".into(), "b".into()]);
        e.board = [[None; SIZE]; SIZE];
        e.board[2][2] = Some(Piece { owner: 0, king: false });
        e.board[3][3] = Some(Piece { owner: 1, king: false });
        let outcome = e.make_move("a", Move::MovePiece { from_row: 2, from_col: 2, to_row: 4, to_col: 4 });
        assert!(outcome.valid);
        assert!(e.board[3][3].is_none());
        assert!(e.board[4][4].is_some());
    }

    #[test]
    fn king_promotion_on_back_row() {
        let mut e = CheckersEngine::new(vec!["a".into(), "b".into()]);
        e.board = [[None; SIZE]; SIZE];
        e.board[6][2] = Some(Piece { owner: 0, king: false });
        e.make_move("a", Move::MovePiece { from_row: 6, from_col: 2, to_row: 7, to_col: 3 });
        assert!(e.board[7][3].unwrap().king);
    }
}
