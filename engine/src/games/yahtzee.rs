//! Yahtzee: 13-category scorecard, 3 rolls per turn.

use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Ones,
    Twos,
    Threes,
    Fours,
    Fives,
    Sixes,
    ThreeOfAKind,
    FourOfAKind,
    FullHouse,
    SmallStraight,
    LargeStraight,
    Yahtzee,
    Chance,
}

const ALL_CATEGORIES: [Category; 13] = [
    Category::Ones,
    Category::Twos,
    Category::Threes,
    Category::Fours,
    Category::Fives,
    Category::Sixes,
    Category::ThreeOfAKind,
    Category::FourOfAKind,
    Category::FullHouse,
    Category::SmallStraight,
    Category::LargeStraight,
    Category::Yahtzee,
    Category::Chance,
];

fn counts(dice: &[u8; 5]) -> [u8; 7] {
    let mut c = [0u8; 7];
    for &d in dice {
        c[d as usize] += 1;
    }
    c
}

#[must_use]
pub fn score_category(dice: &[u8; 5], category: Category) -> u32 {
    let c = counts(dice);
    let sum: u32 = dice.iter().map(|&d| d as u32).sum();
    match category {
        Category::Ones => c[1] as u32 * 1,
        Category::Twos => c[2] as u32 * 2,
        Category::Threes => c[3] as u32 * 3,
        Category::Fours => c[4] as u32 * 4,
        Category::Fives => c[5] as u32 * 5,
        Category::Sixes => c[6] as u32 * 6,
        Category::ThreeOfAKind => if c[1..=6].iter().any(|&n| n >= 3) { sum } else { 0 },
        Category::FourOfAKind => if c[1..=6].iter().any(|&n| n >= 4) { sum } else { 0 },
        Category::FullHouse => {
            let has_three = c[1..=6].iter().any(|&n| n == 3);
            let has_two = c[1..=6].iter().any(|&n| n == 2);
            if (has_three && has_two) || c[1..=6].iter().any(|&n| n == 5) { 25 } else { 0 }
        }
        Category::SmallStraight => {
            let has = |vs: &[u8]| vs.iter().all(|&v| c[v as usize] > 0);
            if has(&[1, 2, 3, 4]) || has(&[2, 3, 4, 5]) || has(&[3, 4, 5, 6]) { 30 } else { 0 }
        }
        Category::LargeStraight => {
            let has = |vs: &[u8]| vs.iter().all(|&v| c[v as usize] > 0) && vs.iter().all(|&v| c[v as usize] == 1);
            if has(&[1, 2, 3, 4, 5]) || has(&[2, 3, 4, 5, 6]) { 40 } else { 0 }
        }
        Category::Yahtzee => if c[1..=6].iter().any(|&n| n == 5) { 50 } else { 0 },
        Category::Chance => sum,
    }
}

#[derive(Clone, Debug)]
pub struct YahtzeeEngine {
    players: Vec<PlayerId>,
    dice: [u8; 5],
    held: Vec<usize>,
    rolls_used: u8,
    scorecards: Vec<HashMap<Category, u32>>,
    turn: usize,
    winner: Option<PlayerId>,
}

impl YahtzeeEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let scorecards = player_ids.iter().map(|_| HashMap::new()).collect();
        Self {
            players: player_ids,
            dice: [0; 5],
            held: Vec::new(),
            rolls_used: 0,
            scorecards,
            turn: 0,
            winner: None,
        }
    }

    fn is_game_over(&self) -> bool {
        self.scorecards.iter().all(|card| card.len() == ALL_CATEGORIES.len())
    }

    fn finish_game_if_done(&mut self) {
        if self.is_game_over() {
            let totals: Vec<u32> = self.scorecards.iter().map(|c| c.values().sum()).collect();
            let best = totals.iter().copied().max().unwrap_or(0);
            self.winner = totals
                .iter()
                .position(|&t| t == best)
                .and_then(|i| self.players.get(i).cloned());
        }
    }
}

impl GameEngine for YahtzeeEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        if self.winner.is_some() {
            return MoveOutcome::invalid("The game is over.");
        }
        if self.players.get(self.turn).map(String::as_str) != Some(player_id) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        match mv {
            Move::RollDice => {
                if self.rolls_used >= 3 {
                    return MoveOutcome::invalid("No rolls left this turn.");
                }
                let mut rng = rand::rng();
                for i in 0..5 {
                    if !self.held.contains(&i) {
                        self.dice[i] = rng.random_range(1..=6);
                    }
                }
                self.rolls_used += 1;
                MoveOutcome::ok(Some(json!({ "dice": self.dice, "rollsUsed": self.rolls_used })))
            }
            Move::HoldDice { indices } => {
                if indices.iter().any(|&i| i >= 5) {
                    return MoveOutcome::invalid("Die index out of range.");
                }
                self.held = indices;
                MoveOutcome::ok(None)
            }
            Move::SelectCategory { category } => {
                if self.rolls_used == 0 {
                    return MoveOutcome::invalid("Roll before scoring.");
                }
                if self.scorecards[self.turn].contains_key(&category) {
                    return MoveOutcome::invalid("That category is already used.");
                }
                let score = score_category(&self.dice, category);
                self.scorecards[self.turn].insert(category, score);
                self.dice = [0; 5];
                self.held.clear();
                self.rolls_used = 0;
                self.turn = (self.turn + 1) % self.players.len().max(1);
                self.finish_game_if_done();
                MoveOutcome::ok(Some(json!({ "scored": score, "category": category })))
            }
            _ => MoveOutcome::invalid("Not a Yahtzee move."),
        }
    }

    fn get_state(&self, _viewer_id: &str) -> serde_json::Value {
        json!({
            "dice": self.dice,
            "held": self.held,
            "rollsUsed": self.rolls_used,
            "scorecards": self.scorecards,
            "currentPlayer": self.players.get(self.turn),
            "winner": self.winner,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        let Some(pos) = self.players.iter().position(|p| p == player_id) else { return };
        self.players.remove(pos);
        self.scorecards.remove(pos);
        if self.players.len() <= 1 {
            self.winner = self.players.first().cloned();
            return;
        }
        self.turn %= self.players.len();
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
    fn yahtzee_scores_fifty() {
        assert_eq!(score_category(&[4, 4, 4, 4, 4], Category::Yahtzee), 50);
    }

    #[test]
    fn large_straight_scores_forty() {
        assert_eq!(score_category(&[2, 3, 4, 5, 6], Category::LargeStraight), 40);
    }

    #[test]
    fn small_straight_ignores_extra_die() {
        assert_eq!(score_category(&[1, 2, 3, 4, 4], Category::SmallStraight), 30);
    }

    #[test]
    fn full_house_requires_triple_and_pair() {
        assert_eq!(score_category(&[3, 3, 3, 5, 5], Category::FullHouse), 25);
        assert_eq!(score_category(&[3, 3, 4, 5, 5], Category::FullHouse), 0);
    }

    #[test]
    fn category_can_only_be_scored_once() {
        let mut e = YahtzeeEngine::new(vec!["a".into(), "b".into()]);
        e.make_move("a", Move::RollDice);
        e.make_move("a", Move::SelectCategory { category: Category::Chance });
        e.make_move("b", Move::RollDice);
        e.make_move("b", Move::SelectCategory { category: Category::Chance });
        let outcome = e.make_move("a", Move::SelectCategory { category: Category::Chance });
        assert!(!outcome.valid);
    }
}
