//! Bot decision-making policies.
//!
//! A `BotDecisionMaker` turns a `GameEngine::get_state` snapshot into a
//! `Move`, submitted through the exact same path a human client would use.
//! This crate has no notion of time, so the jitter the AI driver adds before
//! calling `decide` lives in the server crate, not here.

use crate::game::{GameType, Move};
use crate::poker::WildChoice;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Named parameter sets, one per difficulty, rather than a single canned
/// heuristic. The poker fields pick between loose-passive, balanced, and
/// tight-aggressive play; `move_quality` carries the same idea over to the
/// board and card games (how often the bot takes the best move it can see
/// instead of a random legal one).
#[derive(Clone, Debug)]
pub struct DifficultyParams {
    pub vpip: f32,
    pub pfr: f32,
    pub aggression_factor: f32,
    pub cbet_frequency: f32,
    pub bluffs: bool,
    pub bluff_frequency: f32,
    pub move_quality: f32,
    pub think_min_ms: u64,
    pub think_max_ms: u64,
}

impl DifficultyParams {
    /// Loose-passive: plays many hands, rarely aggressive.
    #[must_use]
    pub fn easy() -> Self {
        Self {
            vpip: 0.45,
            pfr: 0.10,
            aggression_factor: 0.5,
            cbet_frequency: 0.40,
            bluffs: false,
            bluff_frequency: 0.0,
            move_quality: 0.5,
            think_min_ms: 800,
            think_max_ms: 1_600,
        }
    }

    /// Balanced tight-aggressive style.
    #[must_use]
    pub fn medium() -> Self {
        Self {
            vpip: 0.30,
            pfr: 0.20,
            aggression_factor: 1.5,
            cbet_frequency: 0.65,
            bluffs: true,
            bluff_frequency: 0.15,
            move_quality: 0.8,
            think_min_ms: 1_000,
            think_max_ms: 1_800,
        }
    }

    /// Very tight, very aggressive when it does play.
    #[must_use]
    pub fn hard() -> Self {
        Self {
            vpip: 0.20,
            pfr: 0.18,
            aggression_factor: 2.5,
            cbet_frequency: 0.75,
            bluffs: true,
            bluff_frequency: 0.25,
            move_quality: 1.0,
            think_min_ms: 1_200,
            think_max_ms: 2_000,
        }
    }

    #[must_use]
    pub fn from_difficulty(difficulty: BotDifficulty) -> Self {
        match difficulty {
            BotDifficulty::Easy => Self::easy(),
            BotDifficulty::Medium => Self::medium(),
            BotDifficulty::Hard => Self::hard(),
        }
    }
}

fn as_u64(v: &Value, key: &str) -> u64 {
    v.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn find_player<'a>(state: &'a Value, bot_id: &str) -> Option<&'a Value> {
    state.get("players")?.as_array()?.iter().find(|p| p.get("id").and_then(Value::as_str) == Some(bot_id))
}

/// Stateless: every decision is a pure function of the snapshot handed in, so
/// there's nothing to carry between calls beyond an RNG drawn fresh each time.
#[derive(Clone, Copy, Debug, Default)]
pub struct BotDecisionMaker;

impl BotDecisionMaker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Picks this bot's next move for the given game type and state snapshot
    /// (as returned by `GameEngine::get_state(bot_id)`).
    #[must_use]
    pub fn decide(&self, game_type: GameType, state: &Value, bot_id: &str, params: &DifficultyParams) -> Move {
        match game_type {
            GameType::Poker => self.decide_poker(state, bot_id, params),
            GameType::Farkle => self.decide_farkle(state, params),
            GameType::TicTacToe => self.decide_tic_tac_toe(state, params),
            GameType::ConnectFour => self.decide_connect_four(state, params),
            GameType::Checkers => self.decide_checkers(state, bot_id),
            GameType::Battleship => self.decide_battleship(state),
            GameType::War => Move::Flip,
            GameType::Mancala => self.decide_mancala(state, bot_id),
            GameType::Blackjack => self.decide_blackjack(state, bot_id),
            GameType::Yahtzee => self.decide_yahtzee(state),
        }
    }

    // --- Poker ---------------------------------------------------------

    fn decide_poker(&self, state: &Value, bot_id: &str, params: &DifficultyParams) -> Move {
        let mut rng = rand::rng();
        let phase = state.get("phase").and_then(Value::as_str).unwrap_or("");
        match phase {
            "VariantSelect" => {
                use crate::poker::PokerVariant::{FiveCardDraw, FollowTheQueen, SevenCardStud, TexasHoldem};
                let variant = [FiveCardDraw, SevenCardStud, TexasHoldem, FollowTheQueen]
                    .into_iter()
                    .choose(&mut rng)
                    .unwrap_or(TexasHoldem);
                Move::ChooseVariant { variant }
            }
            "WildSelect" => Move::ChooseWilds { wilds: vec![WildChoice::Deuces], last_card_down: Some(rng.random_bool(0.5)) },
            "Ante" => Move::BuyIn,
            "Draw" => Move::StandPat,
            "Showdown" | "Settlement" => Move::NextHand,
            "Betting" => self.decide_poker_bet(state, bot_id, params),
            _ => Move::Fold,
        }
    }

    fn decide_poker_bet(&self, state: &Value, bot_id: &str, params: &DifficultyParams) -> Move {
        let mut rng = rand::rng();
        let Some(me) = find_player(state, bot_id) else {
            return Move::Fold;
        };
        let chips = as_u64(me, "chips");
        let my_bet = as_u64(me, "bet");
        let current_bet = as_u64(state, "currentBet");
        let pot = as_u64(state, "pot");
        let to_call = current_bet.saturating_sub(my_bet);
        let can_check = to_call == 0;

        if can_check && self.should_check(params, &mut rng) {
            return Move::Check;
        }
        if chips <= to_call {
            return Move::AllIn;
        }

        if params.bluffs && rng.random_bool(f64::from(params.bluff_frequency)) {
            let bluff_size = ((pot.max(1) as f32) * 1.5) as u64 + current_bet;
            return if chips <= bluff_size { Move::AllIn } else { Move::Raise { amount: bluff_size } };
        }

        let raise_threshold = 1.0 / (params.aggression_factor + 1.0);
        if rng.random_bool(f64::from(raise_threshold)) {
            let amount = self.poker_raise_amount(params, pot, current_bet, chips, &mut rng);
            return if chips <= amount { Move::AllIn } else { Move::Raise { amount } };
        }

        let pot_odds = if pot > 0 { to_call as f32 / pot as f32 } else { 0.0 };
        if to_call == 0 {
            Move::Check
        } else if pot_odds < 0.3 || rng.random_bool(0.6) {
            if chips <= to_call { Move::AllIn } else { Move::Call }
        } else {
            Move::Fold
        }
    }

    fn should_check(&self, params: &DifficultyParams, rng: &mut impl Rng) -> bool {
        let check_probability = 1.0 / (params.aggression_factor + 1.0);
        rng.random_bool(f64::from(check_probability))
    }

    fn poker_raise_amount(&self, params: &DifficultyParams, pot: u64, current_bet: u64, chips: u64, rng: &mut impl Rng) -> u64 {
        let base_multiplier = if params.aggression_factor < 1.0 {
            2.0
        } else if params.aggression_factor < 2.0 {
            2.5
        } else {
            3.0
        };
        let variance: f32 = rng.random_range(-0.2..=0.2);
        let multiplier = base_multiplier * (1.0 + variance);
        let amount = ((pot + current_bet) as f32 * multiplier) as u64;
        amount.min(chips).max(current_bet + 1)
    }

    // --- Farkle ----------------------------------------------------------

    fn decide_farkle(&self, state: &Value, params: &DifficultyParams) -> Move {
        let has_rolled = state.get("hasRolled").and_then(Value::as_bool).unwrap_or(false);
        if !has_rolled {
            return Move::Roll;
        }
        let dice: Vec<u8> = state
            .get("dice")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_u64).map(|v| v as u8).collect())
            .unwrap_or_default();
        let kept: Vec<usize> = state
            .get("keptIndices")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_u64().map(|n| n as usize)).collect())
            .unwrap_or_default();
        let turn_score = state.get("turnScore").and_then(Value::as_u64).unwrap_or(0);

        let scoring: Vec<usize> = (0..dice.len())
            .filter(|i| !kept.contains(i) && dice[*i] != 0 && (dice[*i] == 1 || dice[*i] == 5))
            .collect();

        if scoring.is_empty() {
            return if turn_score > 0 { Move::Bank } else { Move::Roll };
        }

        let bank_threshold = match params.move_quality {
            q if q >= 1.0 => 800,
            q if q >= 0.8 => 500,
            _ => 300,
        };
        if turn_score >= bank_threshold {
            Move::KeepAndBank { indices: scoring }
        } else {
            Move::KeepAndRoll { indices: scoring }
        }
    }

    // --- Tic-Tac-Toe -------------------------------------------------------

    fn decide_tic_tac_toe(&self, state: &Value, params: &DifficultyParams) -> Move {
        let mut rng = rand::rng();
        let board: Vec<Vec<Option<String>>> = state
            .get("board")
            .and_then(|b| serde_json::from_value(b.clone()).ok())
            .unwrap_or_else(|| vec![vec![None; 3]; 3]);
        let empties: Vec<(usize, usize)> =
            (0..3).flat_map(|r| (0..3).map(move |c| (r, c))).filter(|&(r, c)| board[r][c].is_none()).collect();
        if empties.is_empty() {
            return Move::PlaceMark { row: 0, col: 0 };
        }
        if rng.random_bool(f64::from(params.move_quality)) {
            if let Some(&(r, c)) = empties.iter().find(|&&(r, c)| Self::tic_tac_toe_wins(&board, r, c)) {
                return Move::PlaceMark { row: r, col: c };
            }
        }
        let &(row, col) = empties.iter().choose(&mut rng).unwrap_or(&empties[0]);
        Move::PlaceMark { row, col }
    }

    fn tic_tac_toe_wins(board: &[Vec<Option<String>>], row: usize, col: usize) -> bool {
        let mut trial = board.to_vec();
        let mark = trial[row][col].clone().or(Some("X".to_string()));
        trial[row][col] = mark.clone();
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
        lines.iter().any(|line| line.iter().all(|&(r, c)| trial[r][c] == mark) && line.iter().any(|&(r, c)| (r, c) == (row, col)))
    }

    // --- Connect-Four --------------------------------------------------

    fn decide_connect_four(&self, state: &Value, params: &DifficultyParams) -> Move {
        let mut rng = rand::rng();
        let board: Vec<Vec<Option<usize>>> =
            state.get("board").and_then(|b| serde_json::from_value(b.clone()).ok()).unwrap_or_default();
        let rows = board.len();
        let cols = if rows > 0 { board[0].len() } else { 7 };
        let legal: Vec<usize> = (0..cols).filter(|&c| board.iter().any(|row| row[c].is_none())).collect();
        if legal.is_empty() {
            return Move::DropDisc { col: 0 };
        }
        if rng.random_bool(f64::from(params.move_quality)) {
            // Prefer the center column; a cheap, legible stand-in for a
            // minimax search (opening theory favors center play).
            let center = cols / 2;
            if legal.contains(&center) {
                return Move::DropDisc { col: center };
            }
        }
        let col = *legal.iter().choose(&mut rng).unwrap_or(&legal[0]);
        Move::DropDisc { col }
    }

    // --- Checkers --------------------------------------------------------

    fn decide_checkers(&self, state: &Value, bot_id: &str) -> Move {
        let mut rng = rand::rng();
        let board = state.get("board").and_then(Value::as_array).cloned().unwrap_or_default();
        let current_player = state.get("currentPlayer").and_then(Value::as_str);
        let owner = if Some(bot_id) == current_player { 0 } else { 1 };
        let _ = owner; // owner resolution happens engine-side; we only need any legal-looking move here.

        let mut candidates = Vec::new();
        for (r, row) in board.iter().enumerate() {
            let Some(row) = row.as_array() else { continue };
            for (c, cell) in row.iter().enumerate() {
                if cell.is_null() {
                    continue;
                }
                for (dr, dc) in [(1i32, 1i32), (1, -1), (-1, 1), (-1, -1), (2, 2), (2, -2), (-2, 2), (-2, -2)] {
                    let tr = r as i32 + dr;
                    let tc = c as i32 + dc;
                    if (0..8).contains(&tr) && (0..8).contains(&tc) {
                        candidates.push((r, c, tr as usize, tc as usize));
                    }
                }
            }
        }
        if let Some(&(fr, fc, tr, tc)) = candidates.iter().choose(&mut rng) {
            Move::MovePiece { from_row: fr, from_col: fc, to_row: tr, to_col: tc }
        } else {
            Move::MovePiece { from_row: 0, from_col: 1, to_row: 1, to_col: 0 }
        }
    }

    // --- Battleship ------------------------------------------------------

    fn decide_battleship(&self, state: &Value) -> Move {
        let mut rng = rand::rng();
        let phase = state.get("phase").and_then(Value::as_str).unwrap_or("");
        if phase == "setup" {
            let own_ships = state.get("ownShips").and_then(Value::as_array).map_or(0, Vec::len);
            const FLEET: [usize; 5] = [5, 4, 3, 3, 2];
            let length = FLEET.get(own_ships).copied().unwrap_or(2);
            if own_ships >= FLEET.len() {
                return Move::ConfirmSetup;
            }
            let row = rng.random_range(0..10);
            let col = if length <= 10 { rng.random_range(0..=10 - length) } else { 0 };
            return Move::PlaceShip { row, col, length, horizontal: rng.random_bool(0.5) };
        }

        let tried: Vec<(usize, usize)> = state
            .get("trackingGrid")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|s| {
                        let r = s.get("row")?.as_u64()? as usize;
                        let c = s.get("col")?.as_u64()? as usize;
                        Some((r, c))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let untried: Vec<(usize, usize)> =
            (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).filter(|p| !tried.contains(p)).collect();
        let &(row, col) = untried.iter().choose(&mut rng).unwrap_or(&(0, 0));
        Move::Shoot { row, col }
    }

    // --- Mancala -----------------------------------------------------------

    fn decide_mancala(&self, state: &Value, bot_id: &str) -> Move {
        let mut rng = rand::rng();
        let board: Vec<u32> = state
            .get("board")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_u64).map(|v| v as u32).collect())
            .unwrap_or_default();
        let current_player = state.get("currentPlayer").and_then(Value::as_str);
        let own_side: std::ops::Range<usize> = if current_player == Some(bot_id) { 0..6 } else { 7..13 };
        let own_store = if own_side.start == 0 { 6 } else { 13 };

        let mut legal: Vec<usize> = own_side.clone().filter(|&i| board.get(i).copied().unwrap_or(0) > 0).collect();
        if legal.is_empty() {
            legal = own_side.collect();
        }
        // A pit that lands its last stone exactly in our own store earns an
        // extra turn; prefer it when one is available.
        if let Some(&pit) = legal.iter().find(|&&i| {
            let stones = board.get(i).copied().unwrap_or(0) as usize;
            stones > 0 && (i + stones) % 14 == own_store
        }) {
            return Move::Sow { pit };
        }
        let pit = *legal.iter().choose(&mut rng).unwrap_or(&legal[0]);
        Move::Sow { pit }
    }

    // --- Blackjack -------------------------------------------------------

    fn decide_blackjack(&self, state: &Value, _bot_id: &str) -> Move {
        let phase = state.get("phase").and_then(Value::as_str).unwrap_or("");
        if phase == "betting" {
            return Move::PlaceBet { amount: 10 };
        }
        if phase == "settlement" {
            return Move::NextHand;
        }
        let Some(hand) = state
            .get("hands")
            .and_then(Value::as_array)
            .and_then(|hands| hands.iter().find(|h| h.get("isYou").and_then(Value::as_bool) == Some(true)))
        else {
            return Move::Stand;
        };
        let value = hand.get("value").and_then(Value::as_u64).unwrap_or(21);
        if value < 17 { Move::Hit } else { Move::Stand }
    }

    // --- Yahtzee -----------------------------------------------------------

    fn decide_yahtzee(&self, state: &Value) -> Move {
        let rolls_used = state.get("rollsUsed").and_then(Value::as_u64).unwrap_or(0);
        if rolls_used == 0 {
            return Move::RollDice;
        }
        let dice: Vec<u8> = state
            .get("dice")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_u64).map(|v| v as u8).collect())
            .unwrap_or_default();

        let mut counts = [0u8; 7];
        for &d in &dice {
            if d > 0 {
                counts[d as usize] += 1;
            }
        }
        let best_face = (1..=6).max_by_key(|&f| counts[f as usize]).unwrap_or(1);
        let hold: Vec<usize> = (0..dice.len()).filter(|&i| dice[i] == best_face).collect();

        if rolls_used >= 3 || hold.len() == dice.len() {
            use crate::games::yahtzee::{score_category, Category};
            let mut fixed = [0u8; 5];
            fixed.copy_from_slice(&dice[..5.min(dice.len())]);
            // `scorecards` has no player-id key to match against; since this
            // is only ever called on the acting player's own turn, picking
            // the first card still short of all 13 categories is the acting
            // player's own card in the common two-player case.
            let scorecard = state
                .get("scorecards")
                .and_then(Value::as_array)
                .and_then(|cards| cards.iter().find(|c| c.as_object().is_some_and(|o| o.len() < 13)));
            let already_used = |cat: &Category| {
                let key = serde_json::to_value(cat).ok().and_then(|v| v.as_str().map(str::to_string));
                key.is_some_and(|k| scorecard.is_some_and(|c| c.get(&k).is_some()))
            };
            const ALL: [Category; 13] = [
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
            let category = ALL
                .into_iter()
                .filter(|c| !already_used(c))
                .max_by_key(|&c| score_category(&fixed, c))
                .unwrap_or(Category::Chance);
            return Move::SelectCategory { category };
        }
        Move::HoldDice { indices: hold }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn difficulty_params_from_difficulty_match_presets() {
        assert_eq!(DifficultyParams::from_difficulty(BotDifficulty::Easy).vpip, 0.45);
        assert_eq!(DifficultyParams::from_difficulty(BotDifficulty::Medium).vpip, 0.30);
        assert_eq!(DifficultyParams::from_difficulty(BotDifficulty::Hard).vpip, 0.20);
    }

    #[test]
    fn war_always_flips() {
        let maker = BotDecisionMaker::new();
        let params = DifficultyParams::medium();
        let mv = maker.decide(GameType::War, &json!({}), "bot-1", &params);
        assert!(matches!(mv, Move::Flip));
    }

    #[test]
    fn blackjack_hits_below_seventeen() {
        let maker = BotDecisionMaker::new();
        let params = DifficultyParams::easy();
        let state = json!({
            "phase": "playing",
            "hands": [{"id": "bot-1", "value": 12, "isYou": true}],
            "players": [{"id": "bot-1", "value": 12}],
        });
        let mv = maker.decide(GameType::Blackjack, &state, "bot-1", &params);
        assert!(matches!(mv, Move::Hit));
    }

    #[test]
    fn farkle_rolls_when_dice_not_yet_thrown() {
        let maker = BotDecisionMaker::new();
        let params = DifficultyParams::medium();
        let state = json!({ "hasRolled": false, "dice": [0, 0, 0, 0, 0, 0] });
        let mv = maker.decide(GameType::Farkle, &state, "bot-1", &params);
        assert!(matches!(mv, Move::Roll));
    }

    #[test]
    fn poker_ante_phase_buys_in() {
        let maker = BotDecisionMaker::new();
        let params = DifficultyParams::medium();
        let state = json!({ "phase": "Ante" });
        let mv = maker.decide(GameType::Poker, &state, "bot-1", &params);
        assert!(matches!(mv, Move::BuyIn));
    }
}
