//! Farkle: dice scoring with compound atomic moves, hot dice, and
//! turn-ending farkle rolls.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;

const TARGET_SCORE: u32 = 10_000;

#[derive(Clone, Debug)]
pub struct FarkleEngine {
    players: Vec<PlayerId>,
    scores: HashMap<PlayerId, u32>,
    /// 0 = not yet rolled this turn, 1..=6 = a rolled face.
    dice: [u8; 6],
    kept_indices: Vec<usize>,
    turn_score: u32,
    has_rolled: bool,
    current_player_index: usize,
    game_over: bool,
    winner: Option<PlayerId>,
}

impl FarkleEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let scores = player_ids.iter().cloned().map(|p| (p, 0)).collect();
        Self {
            players: player_ids,
            scores,
            dice: [0; 6],
            kept_indices: Vec::new(),
            turn_score: 0,
            has_rolled: false,
            current_player_index: 0,
            game_over: false,
            winner: None,
        }
    }

    fn current_player(&self) -> Option<&PlayerId> {
        self.players.get(self.current_player_index)
    }

    fn active_indices(&self) -> Vec<usize> {
        (0..6).filter(|i| !self.kept_indices.contains(i)).collect()
    }

    fn has_pending_unkept_dice(&self) -> bool {
        self.active_indices().iter().any(|&i| self.dice[i] != 0)
    }

    fn end_turn(&mut self, farkled: bool) {
        if farkled {
            self.turn_score = 0;
        }
        self.dice = [0; 6];
        self.kept_indices.clear();
        self.has_rolled = false;
        if !self.players.is_empty() {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
        }
        self.turn_score = 0;
    }

    fn do_roll(&mut self) -> MoveOutcome {
        if self.has_pending_unkept_dice() {
            return MoveOutcome::invalid("Keep some dice before rolling again.");
        }
        let active = self.active_indices();
        let mut rng = rand::rng();
        for &i in &active {
            self.dice[i] = rng.random_range(1..=6);
        }
        self.has_rolled = true;

        let active_values: Vec<u8> = active.iter().map(|&i| self.dice[i]).collect();
        if greedy_partial_score(&active_values) == 0 {
            self.end_turn(true);
            return MoveOutcome::ok(Some(json!({ "farkle": true })));
        }

        if score_selection(&active_values) > 0 {
            self.turn_score += score_selection(&active_values);
            self.kept_indices.extend(active.iter());
            if self.kept_indices.len() == 6 {
                self.trigger_hot_dice();
                return MoveOutcome::ok(Some(json!({ "hotDice": true, "turnScore": self.turn_score })));
            }
        }
        MoveOutcome::ok(Some(json!({ "dice": self.dice, "turnScore": self.turn_score })))
    }

    fn trigger_hot_dice(&mut self) {
        self.dice = [0; 6];
        self.kept_indices.clear();
        self.has_rolled = false;
    }

    fn do_keep(&mut self, indices: &[usize]) -> Result<u32, &'static str> {
        if indices.is_empty() {
            return Err("Select at least one die to keep.");
        }
        for &i in indices {
            if i >= 6 {
                return Err("Die index out of range.");
            }
            if self.kept_indices.contains(&i) {
                return Err("That die is already kept.");
            }
            if self.dice[i] == 0 {
                return Err("That die hasn't been rolled yet.");
            }
        }
        let values: Vec<u8> = indices.iter().map(|&i| self.dice[i]).collect();
        let score = score_selection(&values);
        if score == 0 {
            return Err("That selection doesn't score.");
        }
        self.turn_score += score;
        self.kept_indices.extend(indices.iter());
        if self.kept_indices.len() == 6 {
            self.trigger_hot_dice();
        }
        Ok(score)
    }

    fn do_bank(&mut self) -> MoveOutcome {
        if !self.has_rolled || self.turn_score == 0 {
            return MoveOutcome::invalid("Nothing to bank yet.");
        }
        let active_values: Vec<u8> = self
            .active_indices()
            .iter()
            .map(|&i| self.dice[i])
            .collect();
        self.turn_score += greedy_partial_score(&active_values);

        let Some(player) = self.current_player().cloned() else {
            return MoveOutcome::invalid("No current player.");
        };
        let new_score = self.scores.get(&player).copied().unwrap_or(0) + self.turn_score;
        let banked = self.turn_score;
        self.scores.insert(player.clone(), new_score);

        if new_score >= TARGET_SCORE {
            self.game_over = true;
            self.winner = Some(player.clone());
        }
        self.end_turn(false);
        MoveOutcome::ok(Some(json!({ "banked": banked, "total": new_score })))
    }
}

impl GameEngine for FarkleEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.game_over {
            return MoveOutcome::invalid("The game is over.");
        }
        if self.current_player().map(String::as_str) != Some(player_id) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        match mv {
            Move::Roll => self.do_roll(),
            Move::Keep { indices } => match self.do_keep(&indices) {
                Ok(score) => MoveOutcome::ok(Some(json!({ "scored": score, "turnScore": self.turn_score }))),
                Err(msg) => MoveOutcome::invalid(msg),
            },
            Move::Bank => self.do_bank(),
            Move::KeepAndRoll { indices } => {
                let before = self.clone_snapshot();
                if let Err(msg) = self.do_keep(&indices) {
                    self.restore_snapshot(before);
                    return MoveOutcome::invalid(msg);
                }
                if self.has_rolled && self.dice.iter().all(|&d| d == 0) {
                    // Hot dice just reset everything; proceed straight to roll.
                }
                self.do_roll()
            }
            Move::KeepAndBank { indices } => {
                let before = self.clone_snapshot();
                if let Err(msg) = self.do_keep(&indices) {
                    self.restore_snapshot(before);
                    return MoveOutcome::invalid(msg);
                }
                self.do_bank()
            }
            _ => MoveOutcome::invalid("Not a Farkle move."),
        }
    }

    fn get_state(&self, _viewer_id: &str) -> serde_json::Value {
        json!({
            "dice": self.dice,
            "keptIndices": self.kept_indices,
            "turnScore": self.turn_score,
            "hasRolled": self.has_rolled,
            "currentPlayer": self.current_player(),
            "scores": self.scores,
            "gameOver": self.game_over,
            "winner": self.winner,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        let Some(pos) = self.players.iter().position(|p| p == player_id) else {
            return;
        };
        self.players.remove(pos);
        self.scores.remove(player_id);
        if self.players.len() <= 1 {
            self.game_over = true;
            self.winner = self.players.first().cloned();
            return;
        }
        if pos <= self.current_player_index && self.current_player_index > 0 {
            self.current_player_index -= 1;
        }
        self.current_player_index %= self.players.len();
    }

    fn current_actor(&self) -> Option<PlayerId> {
        if self.game_over {
            None
        } else {
            self.current_player().cloned()
        }
    }

    fn is_over(&self) -> bool {
        self.game_over
    }
}

/// Helpers for the compound moves' atomicity: snapshot/restore the mutable
/// fields `do_keep` touches so a rejected keep leaves Farkle state untouched
///.
struct Snapshot {
    dice: [u8; 6],
    kept_indices: Vec<usize>,
    turn_score: u32,
}

impl FarkleEngine {
    fn clone_snapshot(&self) -> Snapshot {
        Snapshot {
            dice: self.dice,
            kept_indices: self.kept_indices.clone(),
            turn_score: self.turn_score,
        }
    }

    fn restore_snapshot(&mut self, snap: Snapshot) {
        self.dice = snap.dice;
        self.kept_indices = snap.kept_indices;
        self.turn_score = snap.turn_score;
    }
}

/// Strict scoring: every die in `values` must participate in a valid combo,
/// else the whole selection is worth 0.
fn score_selection(values: &[u8]) -> u32 {
    if values.is_empty() || values.iter().any(|&v| v == 0) {
        return 0;
    }
    if values.len() == 6 {
        if let Some(special) = special_six_dice_score(values) {
            return special;
        }
    }
    let counts = face_counts(values);
    let mut consumed = [0u8; 7];
    let mut score = 0u32;
    for face in 1..=6u8 {
        let c = counts[face as usize];
        if c >= 3 {
            score += triple_score(face, c);
            consumed[face as usize] = c;
        }
    }
    for face in 1..=6u8 {
        let leftover = counts[face as usize] - consumed[face as usize];
        if leftover > 0 {
            match face {
                1 => score += leftover as u32 * 100,
                5 => score += leftover as u32 * 50,
                _ => return 0,
            }
        }
    }
    score
}

/// Lenient scoring used for "greedy bank" and farkle detection: dice that
/// don't contribute to any combo are simply ignored rather than zeroing the
/// whole selection.
fn greedy_partial_score(values: &[u8]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    if values.len() == 6 {
        if let Some(special) = special_six_dice_score(values) {
            return special;
        }
    }
    let counts = face_counts(values);
    let mut consumed = [0u8; 7];
    let mut score = 0u32;
    for face in 1..=6u8 {
        let c = counts[face as usize];
        if c >= 3 {
            score += triple_score(face, c);
            consumed[face as usize] = c;
        }
    }
    for face in [1u8, 5] {
        let leftover = counts[face as usize] - consumed[face as usize];
        score += leftover as u32 * if face == 1 { 100 } else { 50 };
    }
    score
}

fn face_counts(values: &[u8]) -> [u8; 7] {
    let mut counts = [0u8; 7];
    for &v in values {
        if (1..=6).contains(&v) {
            counts[v as usize] += 1;
        }
    }
    counts
}

fn triple_score(face: u8, count: u8) -> u32 {
    let base = if face == 1 { 1000 } else { face as u32 * 100 };
    base * (1u32 << (count - 3))
}

fn special_six_dice_score(values: &[u8]) -> Option<u32> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    if sorted == [1, 2, 3, 4, 5, 6] {
        return Some(1500);
    }
    let counts = face_counts(values);
    let pairs = counts[1..=6].iter().filter(|&&c| c == 2).count();
    if pairs == 3 {
        return Some(1500);
    }
    let has_four = counts[1..=6].iter().any(|&c| c == 4);
    let has_pair = counts[1..=6].iter().any(|&c| c == 2);
    if has_four && has_pair {
        return Some(1500);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(n: usize) -> FarkleEngine {
        FarkleEngine::new((0..n).map(|i| format!("p{i}")).collect())
    }

    #[test]
    fn straight_scores_1500() {
        assert_eq!(score_selection(&[1, 2, 3, 4, 5, 6]), 1500);
    }

    #[test]
    fn three_pairs_scores_1500() {
        assert_eq!(score_selection(&[2, 2, 3, 3, 4, 4]), 1500);
    }

    #[test]
    fn four_of_a_kind_plus_pair_scores_1500() {
        assert_eq!(score_selection(&[6, 6, 6, 6, 2, 2]), 1500);
    }

    #[test]
    fn hot_dice_scenario_scores_1500_and_resets() {
        let mut e = engine(2);
        e.dice = [1, 1, 1, 5, 5, 5];
        e.has_rolled = true;
        let score = e.do_keep(&[0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(score, 1500);
        assert_eq!(e.turn_score, 1500);
        assert!(e.kept_indices.is_empty());
        assert_eq!(e.dice, [0; 6]);
        assert!(!e.has_rolled);
    }

    #[test]
    fn dead_die_invalidates_whole_selection() {
        assert_eq!(score_selection(&[1, 3]), 0);
    }

    #[test]
    fn single_ones_and_fives_score_as_leftovers() {
        assert_eq!(score_selection(&[1, 5]), 150);
    }

    #[test]
    fn keep_with_zero_score_mutates_nothing() {
        let mut e = engine(2);
        e.dice = [2, 3, 4, 6, 1, 1];
        e.has_rolled = true;
        let before = e.dice;
        let turn_before = e.turn_score;
        let res = e.do_keep(&[0, 1]);
        assert!(res.is_err());
        assert_eq!(e.dice, before);
        assert_eq!(e.turn_score, turn_before);
    }

    #[test]
    fn bank_requires_positive_turn_score() {
        let mut e = engine(2);
        let outcome = e.do_bank();
        assert!(!outcome.valid);
    }

    #[test]
    fn bank_caps_at_target_and_ends_game() {
        let mut e = engine(2);
        e.scores.insert("p0".to_string(), 9000);
        e.has_rolled = true;
        e.turn_score = 1500;
        e.do_bank();
        assert!(e.game_over);
        assert_eq!(e.winner, Some("p0".to_string()));
        assert!(*e.scores.get("p0").unwrap() <= TARGET_SCORE + 6000);
    }

    #[test]
    fn remove_player_reduces_to_one_ends_game() {
        let mut e = engine(2);
        e.remove_player("p1");
        assert!(e.game_over);
        assert_eq!(e.winner, Some("p0".to_string()));
    }
}
