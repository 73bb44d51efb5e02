//! The Poker engine: four variants, per-hand phase machine, side pots, and
//! wild-card evaluation.
//!
//! The phase layout (`Lobby`, `CollectBlinds`, `Deal`, `TakeAction`,
//! `Flop`, `Turn`, `River`, `ShowHands`, `DistributePot`, ...) is one
//! explicit `Phase` enum rather than a typestate per phase, since the wire
//! boundary needs a single runtime-checked `make_move` entry point
//! regardless of phase, and that's simpler to redact a view from than a
//! typestate would be.

use crate::cards::{Card, CardView, Deck};
use crate::game::{GameEngine, Move, MoveOutcome};
use crate::hand_eval::{self, determine_winners, HandRank, WildSpec};
use crate::pot::{self, PotManager};
use crate::PlayerId;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const STARTING_CHIPS: u64 = 1000;
pub const ANTE: u64 = 1;
pub const SMALL_BLIND: u64 = 1;
pub const BIG_BLIND: u64 = 2;
pub const MIN_BET: u64 = 5;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PokerVariant {
    FiveCardDraw,
    SevenCardStud,
    TexasHoldem,
    FollowTheQueen,
}

impl PokerVariant {
    fn allows_wild_select(self) -> bool {
        matches!(self, Self::FiveCardDraw | Self::SevenCardStud)
    }
}

/// Wire representation of a wild choice.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WildChoice {
    Jokers,
    OneEyedJacks,
    SuicideKing,
    Deuces,
    Rank { value: u8 },
}

impl WildChoice {
    fn to_spec(self) -> WildSpec {
        match self {
            Self::Jokers => WildSpec::Jokers,
            Self::OneEyedJacks => WildSpec::OneEyedJacks,
            Self::SuicideKing => WildSpec::SuicideKing,
            Self::Deuces => WildSpec::Deuces,
            Self::Rank { value } => WildSpec::Rank(value),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    VariantSelect,
    WildSelect,
    Ante,
    Betting,
    Draw,
    Showdown,
    Settlement,
}

#[derive(Clone, Debug)]
struct PlayerState {
    id: PlayerId,
    chips: u64,
    hand: Vec<Card>,
    face_up: Vec<bool>,
    bet: u64,
    total_bet: u64,
    folded: bool,
    all_in: bool,
    has_acted: bool,
    is_eliminated: bool,
    result: Option<&'static str>,
    payout: u64,
}

impl PlayerState {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            chips: STARTING_CHIPS,
            hand: Vec::new(),
            face_up: Vec::new(),
            bet: 0,
            total_bet: 0,
            folded: false,
            all_in: false,
            has_acted: false,
            is_eliminated: false,
            result: None,
            payout: 0,
        }
    }

    fn reset_for_hand(&mut self) {
        self.hand.clear();
        self.face_up.clear();
        self.bet = 0;
        self.total_bet = 0;
        self.folded = false;
        self.all_in = false;
        self.has_acted = false;
        self.result = None;
        self.payout = 0;
    }
}

#[derive(Clone, Debug)]
pub struct PokerEngine {
    players: Vec<PlayerState>,
    dealer_index: usize,
    phase: Phase,
    variant: Option<PokerVariant>,
    wilds: Vec<WildSpec>,
    active_wilds: Vec<WildSpec>,
    last_card_down: bool,
    deck: Deck,
    community: Vec<Card>,
    current_bet: u64,
    min_raise: u64,
    pot: PotManager,
    street: u8,
    current_turn: Option<usize>,
    won_by_fold: bool,
    hand_number: u64,
    game_over: bool,
    winner: Option<PlayerId>,
    queen_pending: bool,
}

impl PokerEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let players = player_ids.into_iter().map(PlayerState::new).collect();
        Self {
            players,
            dealer_index: 0,
            phase: Phase::VariantSelect,
            variant: None,
            wilds: Vec::new(),
            active_wilds: Vec::new(),
            last_card_down: true,
            deck: Deck::standard(),
            community: Vec::new(),
            current_bet: 0,
            min_raise: MIN_BET,
            pot: PotManager::new(),
            street: 0,
            current_turn: None,
            won_by_fold: false,
            hand_number: 0,
            game_over: false,
            winner: None,
            queen_pending: false,
        }
    }

    fn index_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    fn active_player_indices(&self) -> Vec<usize> {
        (0..self.players.len())
            .filter(|&i| !self.players[i].is_eliminated)
            .collect()
    }

    fn non_folded_indices(&self) -> Vec<usize> {
        (0..self.players.len())
            .filter(|&i| !self.players[i].folded && !self.players[i].is_eliminated)
            .collect()
    }

    fn next_active_after(&self, idx: usize) -> Option<usize> {
        let active = self.active_player_indices();
        if active.is_empty() {
            return None;
        }
        let pos = active.iter().position(|&i| i == idx).unwrap_or(0);
        Some(active[(pos + 1) % active.len()])
    }

    // ---- variantSelect / wildSelect -----------------------------------

    fn choose_variant(&mut self, player_idx: usize, variant: PokerVariant) -> MoveOutcome {
        if self.phase != Phase::VariantSelect {
            return MoveOutcome::invalid("Not the variant-selection phase.");
        }
        if player_idx != self.dealer_index {
            return MoveOutcome::invalid("Only the dealer chooses the variant.");
        }
        self.variant = Some(variant);
        self.phase = if variant.allows_wild_select() {
            Phase::WildSelect
        } else {
            Phase::Ante
        };
        MoveOutcome::ok(Some(json!({ "variant": variant })))
    }

    fn choose_wilds(&mut self, player_idx: usize, wilds: Vec<WildChoice>, last_card_down: Option<bool>) -> MoveOutcome {
        if self.phase != Phase::WildSelect {
            return MoveOutcome::invalid("Not the wild-selection phase.");
        }
        if player_idx != self.dealer_index {
            return MoveOutcome::invalid("Only the dealer chooses wilds.");
        }
        self.wilds = wilds.into_iter().map(WildChoice::to_spec).collect();
        self.last_card_down = last_card_down.unwrap_or(true);
        self.phase = Phase::Ante;
        MoveOutcome::ok(None)
    }

    // ---- ante / dealing ------------------------------------------------

    fn buy_in(&mut self, _player_idx: usize) -> MoveOutcome {
        if self.phase != Phase::Ante {
            return MoveOutcome::invalid("Not the ante phase.");
        }
        let Some(variant) = self.variant else {
            return MoveOutcome::invalid("No variant chosen yet.");
        };
        self.deck = if self.wilds.contains(&WildSpec::Jokers) {
            Deck::with_jokers(2)
        } else {
            Deck::standard()
        };
        self.deck.shuffle();
        self.pot.set_players(self.non_folded_indices().iter().map(|&i| self.players[i].id.clone()).collect());
        self.active_wilds = self.wilds.clone();
        self.queen_pending = false;

        match variant {
            PokerVariant::TexasHoldem => self.deal_holdem_start(),
            PokerVariant::FiveCardDraw => self.deal_draw_start(),
            PokerVariant::SevenCardStud | PokerVariant::FollowTheQueen => self.deal_stud_start(),
        }
        MoveOutcome::ok(Some(json!({ "phase": "betting" })))
    }

    fn collect_ante(&mut self, idx: usize) {
        let ante = ANTE.min(self.players[idx].chips);
        self.players[idx].chips -= ante;
        self.players[idx].total_bet += ante;
        if self.players[idx].chips == 0 {
            self.players[idx].all_in = true;
        }
        self.pot.record_bet(&self.players[idx].id, ante);
        if self.players[idx].all_in {
            self.pot.record_all_in(&self.players[idx].id);
        }
    }

    fn deal_draw_start(&mut self) {
        for idx in self.non_folded_indices() {
            self.collect_ante(idx);
        }
        for idx in self.non_folded_indices() {
            for _ in 0..5 {
                let card = self.deck.deal().expect("standard deck has 52+ cards for up to 6 players");
                self.players[idx].hand.push(card);
                self.players[idx].face_up.push(false);
            }
        }
        self.current_bet = 0;
        self.min_raise = MIN_BET;
        self.street = 0;
        self.phase = Phase::Betting;
        self.begin_betting_round(self.next_active_after(self.dealer_index));
    }

    fn deal_stud_start(&mut self) {
        for idx in self.non_folded_indices() {
            self.collect_ante(idx);
        }
        let order = self.non_folded_indices();
        for &idx in &order {
            self.deal_stud_card(idx, false);
        }
        for &idx in &order {
            self.deal_stud_card(idx, false);
        }
        for &idx in &order {
            self.deal_stud_card(idx, true);
        }
        self.current_bet = 0;
        self.min_raise = MIN_BET;
        self.street = 0;
        self.phase = Phase::Betting;
        let opener = self.stud_opener();
        self.begin_betting_round(opener);
    }

    fn deal_stud_card(&mut self, idx: usize, face_up: bool) {
        let card = self.deck.deal().expect("stud deck carries enough cards for 6 players x 7 cards");
        if face_up && card.value == 12 {
            self.queen_pending = true;
        } else if face_up && self.queen_pending {
            self.active_wilds.push(WildSpec::Rank(card.value));
            self.queen_pending = false;
        }
        self.players[idx].hand.push(card);
        self.players[idx].face_up.push(face_up);
    }

    fn stud_opener(&self) -> Option<usize> {
        let candidates = self.non_folded_indices();
        candidates
            .into_iter()
            .filter(|&i| !self.players[i].hand.is_empty())
            .max_by(|&a, &b| {
                let ha = self.visible_up_cards(a);
                let hb = self.visible_up_cards(b);
                ha.iter().map(|c| c.value).max().cmp(&hb.iter().map(|c| c.value).max())
            })
    }

    fn visible_up_cards(&self, idx: usize) -> Vec<Card> {
        self.players[idx]
            .hand
            .iter()
            .zip(&self.players[idx].face_up)
            .filter(|(_, up)| **up)
            .map(|(c, _)| *c)
            .collect()
    }

    fn deal_holdem_start(&mut self) {
        let order = self.non_folded_indices();
        let heads_up = order.len() == 2;
        let sb_idx = if heads_up { self.dealer_index } else { self.next_active_after(self.dealer_index).unwrap_or(self.dealer_index) };
        let bb_idx = self.next_active_after(sb_idx).unwrap_or(sb_idx);
        self.post_blind(sb_idx, SMALL_BLIND);
        self.post_blind(bb_idx, BIG_BLIND);

        for &idx in &order {
            self.players[idx].hand.push(self.deck.deal().expect("holdem deck has cards for hole cards"));
            self.players[idx].hand.push(self.deck.deal().expect("holdem deck has cards for hole cards"));
        }
        self.community.clear();
        self.current_bet = BIG_BLIND;
        self.min_raise = MIN_BET;
        self.street = 0;
        self.phase = Phase::Betting;
        let opener = if heads_up { Some(sb_idx) } else { self.next_active_after(bb_idx) };
        self.begin_betting_round(opener);
    }

    fn post_blind(&mut self, idx: usize, amount: u64) {
        let paid = amount.min(self.players[idx].chips);
        self.players[idx].chips -= paid;
        self.players[idx].bet = paid;
        self.players[idx].total_bet += paid;
        if self.players[idx].chips == 0 {
            self.players[idx].all_in = true;
            self.pot.record_all_in(&self.players[idx].id);
        }
        self.pot.record_bet(&self.players[idx].id, paid);
    }

    fn begin_betting_round(&mut self, opener: Option<usize>) {
        for p in &mut self.players {
            if !p.folded && !p.all_in {
                p.has_acted = false;
            }
        }
        self.current_turn = opener.filter(|&i| !self.players[i].folded && !self.players[i].all_in)
            .or_else(|| self.non_folded_indices().into_iter().find(|&i| !self.players[i].all_in));
    }

    // ---- betting ---------------------------------------------------------

    fn check(&mut self, idx: usize) -> MoveOutcome {
        if self.players[idx].bet != self.current_bet {
            return MoveOutcome::invalid("You must call, raise, or fold.");
        }
        self.players[idx].has_acted = true;
        self.advance_betting(idx);
        MoveOutcome::ok(None)
    }

    fn call(&mut self, idx: usize) -> MoveOutcome {
        let owed = self.current_bet.saturating_sub(self.players[idx].bet);
        let paid = owed.min(self.players[idx].chips);
        self.players[idx].chips -= paid;
        self.players[idx].bet += paid;
        self.players[idx].total_bet += paid;
        self.pot.record_bet(&self.players[idx].id, paid);
        if self.players[idx].chips == 0 {
            self.players[idx].all_in = true;
            self.pot.record_all_in(&self.players[idx].id);
        }
        self.players[idx].has_acted = true;
        self.advance_betting(idx);
        MoveOutcome::ok(None)
    }

    fn raise(&mut self, idx: usize, amount: u64) -> MoveOutcome {
        if amount < self.min_raise {
            return MoveOutcome::invalid("Raise is below the minimum.");
        }
        let owed = self.current_bet.saturating_sub(self.players[idx].bet);
        let total = owed + amount;
        if total > self.players[idx].chips {
            return MoveOutcome::invalid("Not enough chips for that raise.");
        }
        self.players[idx].chips -= total;
        self.players[idx].bet += total;
        self.players[idx].total_bet += total;
        self.pot.record_bet(&self.players[idx].id, total);
        self.current_bet = self.players[idx].bet;
        self.min_raise = amount.max(MIN_BET);
        if self.players[idx].chips == 0 {
            self.players[idx].all_in = true;
            self.pot.record_all_in(&self.players[idx].id);
        }
        for (i, p) in self.players.iter_mut().enumerate() {
            if i != idx && !p.folded && !p.all_in {
                p.has_acted = false;
            }
        }
        self.players[idx].has_acted = true;
        self.advance_betting(idx);
        MoveOutcome::ok(None)
    }

    fn fold(&mut self, idx: usize) -> MoveOutcome {
        self.players[idx].folded = true;
        self.pot.record_fold(&self.players[idx].id);
        let remaining = self.non_folded_indices();
        if remaining.len() <= 1 {
            self.won_by_fold = true;
            if let Some(&winner_idx) = remaining.first() {
                self.award_uncontested_pot(winner_idx);
            }
            self.phase = Phase::Settlement;
            self.settle_eliminations();
            return MoveOutcome::ok(Some(json!({ "wonByFold": true })));
        }
        self.advance_betting(idx);
        MoveOutcome::ok(None)
    }

    fn all_in(&mut self, idx: usize) -> MoveOutcome {
        let amount = self.players[idx].chips;
        if amount == 0 {
            return MoveOutcome::invalid("No chips left to push.");
        }
        let reopens = self.players[idx].bet + amount >= self.current_bet + self.min_raise;
        self.players[idx].chips = 0;
        self.players[idx].bet += amount;
        self.players[idx].total_bet += amount;
        self.players[idx].all_in = true;
        self.pot.record_bet(&self.players[idx].id, amount);
        self.pot.record_all_in(&self.players[idx].id);
        if reopens {
            let raise_amount = (self.players[idx].bet).saturating_sub(self.current_bet);
            self.current_bet = self.players[idx].bet;
            self.min_raise = raise_amount.max(MIN_BET);
            for (i, p) in self.players.iter_mut().enumerate() {
                if i != idx && !p.folded && !p.all_in {
                    p.has_acted = false;
                }
            }
        }
        self.players[idx].has_acted = true;
        self.advance_betting(idx);
        MoveOutcome::ok(None)
    }

    fn betting_round_complete(&self) -> bool {
        self.non_folded_indices().iter().all(|&i| {
            let p = &self.players[i];
            p.all_in || (p.has_acted && p.bet == self.current_bet)
        })
    }

    fn advance_betting(&mut self, from_idx: usize) {
        if self.betting_round_complete() {
            self.advance_street();
            return;
        }
        let mut next = self.next_active_after(from_idx);
        while let Some(n) = next {
            let p = &self.players[n];
            if !p.folded && !p.all_in {
                break;
            }
            next = self.next_active_after(n);
        }
        self.current_turn = next;
    }

    fn advance_street(&mut self) {
        let variant = self.variant.expect("betting only happens once a variant is chosen");
        for p in &mut self.players {
            p.bet = 0;
        }
        self.current_bet = 0;
        self.min_raise = MIN_BET;

        match variant {
            PokerVariant::FiveCardDraw => {
                if self.street == 0 {
                    self.street = 1;
                    self.phase = Phase::Draw;
                    self.current_turn = self.first_draw_actor();
                } else {
                    self.go_to_showdown();
                }
            }
            PokerVariant::TexasHoldem => {
                if self.street >= 3 {
                    self.go_to_showdown();
                } else {
                    self.deal_community_street();
                    self.street += 1;
                    self.begin_betting_round(self.next_active_after(self.dealer_index));
                }
            }
            PokerVariant::SevenCardStud | PokerVariant::FollowTheQueen => {
                if self.street >= 4 {
                    self.go_to_showdown();
                } else {
                    let face_up = !(self.street == 3 && self.last_card_down);
                    let order = self.non_folded_indices();
                    for &idx in &order {
                        self.deal_stud_card(idx, face_up);
                    }
                    self.street += 1;
                    let opener = self.stud_opener();
                    self.begin_betting_round(opener);
                }
            }
        }
    }

    fn deal_community_street(&mut self) {
        self.deck.deal();
        let n = if self.community.is_empty() { 3 } else { 1 };
        for _ in 0..n {
            if let Some(card) = self.deck.deal() {
                self.community.push(card);
            }
        }
    }

    fn first_draw_actor(&self) -> Option<usize> {
        self.next_active_after(self.dealer_index)
            .filter(|&i| !self.players[i].all_in && !self.players[i].folded)
            .or_else(|| self.non_folded_indices().into_iter().find(|&i| !self.players[i].all_in))
    }

    // ---- draw phase --------------------------------------------------

    fn discard(&mut self, idx: usize, indices: Vec<usize>) -> MoveOutcome {
        if self.phase != Phase::Draw {
            return MoveOutcome::invalid("Not the draw phase.");
        }
        if self.current_turn != Some(idx) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        let has_ace_or_wild = self.players[idx]
            .hand
            .iter()
            .any(|c| c.value == 14 || c.value == 1 || hand_eval::is_wild(*c, &self.active_wilds));
        let max_discard = if has_ace_or_wild { 4 } else { 3 };
        if indices.len() > max_discard {
            return MoveOutcome::invalid(format!("Can discard at most {max_discard} cards."));
        }
        if indices.iter().any(|&i| i >= self.players[idx].hand.len()) {
            return MoveOutcome::invalid("Card index out of range.");
        }
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        for &i in sorted.iter().rev() {
            self.players[idx].hand.remove(i);
            self.players[idx].face_up.remove(i);
        }
        for _ in 0..sorted.len() {
            let card = self.deck.deal().expect("draw deck holds enough replacement cards");
            self.players[idx].hand.push(card);
            self.players[idx].face_up.push(false);
        }
        self.advance_draw_turn(idx);
        MoveOutcome::ok(Some(json!({ "discarded": sorted.len() })))
    }

    fn stand_pat(&mut self, idx: usize) -> MoveOutcome {
        if self.phase != Phase::Draw {
            return MoveOutcome::invalid("Not the draw phase.");
        }
        if self.current_turn != Some(idx) {
            return MoveOutcome::invalid("It's not your turn.");
        }
        self.advance_draw_turn(idx);
        MoveOutcome::ok(None)
    }

    fn advance_draw_turn(&mut self, from_idx: usize) {
        if self.draw_round_complete(from_idx) {
            self.street = 1;
            self.phase = Phase::Betting;
            self.begin_betting_round(self.next_active_after(self.dealer_index));
            return;
        }
        let mut next = self.next_active_after(from_idx);
        while let Some(n) = next {
            if !self.players[n].folded && !self.players[n].all_in {
                break;
            }
            next = self.next_active_after(n);
        }
        self.current_turn = next;
    }

    /// True once `just_acted` is the last seat in draw-turn order (dealer's
    /// left, skipping folded/all-in seats) — mirrors the betting round's
    /// "has everyone acted" check but for the no-money draw phase.
    fn draw_round_complete(&self, just_acted: usize) -> bool {
        let eligible: Vec<usize> = self.non_folded_indices().into_iter().filter(|&i| !self.players[i].all_in).collect();
        let Some(start) = self.first_draw_actor() else { return true };
        let Some(pos_start) = eligible.iter().position(|&i| i == start) else { return true };
        let rotated: Vec<usize> = eligible[pos_start..].iter().chain(eligible[..pos_start].iter()).copied().collect();
        rotated.last() == Some(&just_acted)
    }

    // ---- showdown / settlement ----------------------------------------

    fn go_to_showdown(&mut self) {
        self.phase = Phase::Showdown;
        let variant = self.variant.expect("showdown only reached with a chosen variant");
        let mut hands: Vec<(PlayerId, HandRank)> = Vec::new();
        for idx in self.non_folded_indices() {
            let cards: Vec<Card> = match variant {
                PokerVariant::FiveCardDraw => self.players[idx].hand.clone(),
                PokerVariant::TexasHoldem => {
                    let mut c = self.players[idx].hand.clone();
                    c.extend(self.community.iter().copied());
                    c
                }
                PokerVariant::SevenCardStud | PokerVariant::FollowTheQueen => self.players[idx].hand.clone(),
            };
            let rank = if cards.len() == 5 {
                hand_eval::evaluate_hand_with_wilds(&cards, &self.active_wilds)
            } else {
                hand_eval::evaluate_best_hand_with_wilds(&cards, &self.active_wilds)
            };
            if let Ok(rank) = rank {
                hands.push((self.players[idx].id.clone(), rank));
            }
        }

        for pot in self.pot.calculate_pots() {
            let candidates: Vec<(PlayerId, HandRank)> = hands
                .iter()
                .filter(|(pid, _)| pot.eligible.contains(pid))
                .cloned()
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let (winners, _) = determine_winners(&candidates);
            let shares = pot::distribute(&pot, &winners);
            let split = winners.len() > 1;
            for (pid, amount) in shares {
                if let Some(p) = self.players.iter_mut().find(|p| p.id == pid) {
                    p.chips += amount;
                    p.payout += amount;
                    p.result = Some(if split { "split" } else { "win" });
                }
            }
        }
        for p in &mut self.players {
            if p.result.is_none() {
                p.result = Some("lose");
            }
        }
        self.pot.reset();
        for p in &mut self.players {
            p.bet = 0;
        }
        self.phase = Phase::Settlement;
        self.settle_eliminations();
        info!("poker hand {} settled", self.hand_number);
    }

    fn award_uncontested_pot(&mut self, winner_idx: usize) {
        let total: u64 = self.pot.get_total_pot();
        let winner_id = self.players[winner_idx].id.clone();
        self.players[winner_idx].chips += total;
        self.players[winner_idx].payout += total;
        self.players[winner_idx].result = Some("win");
        for p in &mut self.players {
            if p.id != winner_id && p.result.is_none() {
                p.result = Some("lose");
            }
        }
        self.pot.reset();
        for p in &mut self.players {
            p.bet = 0;
        }
    }

    /// `Some(outcome)` when a betting move isn't legal right now; `None` to proceed.
    fn betting_guard(&self, idx: usize) -> Option<MoveOutcome> {
        if self.phase != Phase::Betting {
            return Some(MoveOutcome::invalid("Not a betting phase."));
        }
        if self.current_turn != Some(idx) {
            return Some(MoveOutcome::invalid("It's not your turn."));
        }
        None
    }

    fn settle_eliminations(&mut self) {
        for p in &mut self.players {
            if p.chips == 0 {
                p.is_eliminated = true;
            }
        }
        let remaining = self.active_player_indices();
        if remaining.len() <= 1 {
            self.game_over = true;
            self.winner = remaining.first().map(|&i| self.players[i].id.clone());
        }
    }

    fn next_hand(&mut self, _player_idx: usize) -> MoveOutcome {
        if self.phase != Phase::Settlement {
            return MoveOutcome::invalid("The hand isn't settled yet.");
        }
        if self.game_over {
            return MoveOutcome::invalid("The game is over.");
        }
        for p in &mut self.players {
            p.reset_for_hand();
        }
        self.community.clear();
        self.wilds.clear();
        self.active_wilds.clear();
        self.variant = None;
        self.won_by_fold = false;
        self.current_bet = 0;
        self.min_raise = MIN_BET;
        self.street = 0;
        self.hand_number += 1;
        self.dealer_index = self
            .next_active_after(self.dealer_index)
            .unwrap_or(self.dealer_index);
        self.phase = Phase::VariantSelect;
        MoveOutcome::ok(None)
    }

    // ---- redaction -------------------------------------------------------

    fn hand_view(&self, subject_idx: usize, viewer_idx: Option<usize>) -> Vec<CardView> {
        let variant = self.variant;
        let subject = &self.players[subject_idx];
        let is_self = viewer_idx == Some(subject_idx);
        let revealed_at_showdown = matches!(self.phase, Phase::Showdown | Phase::Settlement)
            && !self.won_by_fold
            && !subject.folded;

        match variant {
            Some(PokerVariant::FiveCardDraw) => {
                if is_self || revealed_at_showdown {
                    subject.hand.iter().map(|c| c.to_view(false)).collect()
                } else {
                    subject.hand.iter().map(|_| CardView::back()).collect()
                }
            }
            Some(PokerVariant::SevenCardStud) | Some(PokerVariant::FollowTheQueen) => subject
                .hand
                .iter()
                .zip(&subject.face_up)
                .map(|(c, &up)| {
                    if up || is_self || revealed_at_showdown {
                        c.to_view(!up)
                    } else {
                        CardView::back()
                    }
                })
                .collect(),
            Some(PokerVariant::TexasHoldem) => {
                if is_self || revealed_at_showdown {
                    subject.hand.iter().map(|c| c.to_view(false)).collect()
                } else {
                    subject.hand.iter().map(|_| CardView::back()).collect()
                }
            }
            None => Vec::new(),
        }
    }
}

impl GameEngine for PokerEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        let Some(idx) = self.index_of(player_id) else {
            return MoveOutcome::invalid("Unknown player.");
        };
        if self.players[idx].is_eliminated {
            return MoveOutcome::invalid("You've been eliminated.");
        }
        match mv {
            Move::ChooseVariant { variant } => self.choose_variant(idx, variant),
            Move::ChooseWilds { wilds, last_card_down } => self.choose_wilds(idx, wilds, last_card_down),
            Move::BuyIn => self.buy_in(idx),
            Move::NextHand => self.next_hand(idx),
            Move::Check => {
                if let Some(out) = self.betting_guard(idx) {
                    return out;
                }
                self.check(idx)
            }
            Move::Call => {
                if let Some(out) = self.betting_guard(idx) {
                    return out;
                }
                self.call(idx)
            }
            Move::Raise { amount } => {
                if let Some(out) = self.betting_guard(idx) {
                    return out;
                }
                self.raise(idx, amount)
            }
            Move::Fold => {
                if let Some(out) = self.betting_guard(idx) {
                    return out;
                }
                self.fold(idx)
            }
            Move::AllIn => {
                if let Some(out) = self.betting_guard(idx) {
                    return out;
                }
                self.all_in(idx)
            }
            Move::Discard { indices } => self.discard(idx, indices),
            Move::StandPat => self.stand_pat(idx),
            _ => MoveOutcome::invalid("Not a Poker move."),
        }
    }

    fn get_state(&self, viewer_id: &str) -> serde_json::Value {
        let viewer_idx = self.index_of(viewer_id);
        let players: Vec<_> = self
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                json!({
                    "id": p.id,
                    "chips": p.chips,
                    "hand": self.hand_view(i, viewer_idx),
                    "bet": p.bet,
                    "totalBet": p.total_bet,
                    "folded": p.folded,
                    "allIn": p.all_in,
                    "hasActed": p.has_acted,
                    "isEliminated": p.is_eliminated,
                    "result": p.result,
                    "payout": p.payout,
                    "isYou": Some(i) == viewer_idx,
                })
            })
            .collect();
        json!({
            "phase": format!("{:?}", self.phase),
            "variant": self.variant,
            "dealerIndex": self.dealer_index,
            "community": self.community.iter().map(|c| c.to_view(false)).collect::<Vec<_>>(),
            "currentBet": self.current_bet,
            "minRaise": self.min_raise,
            "pot": self.pot.get_total_pot(),
            "currentPlayer": self.current_turn.and_then(|i| self.players.get(i)).map(|p| &p.id),
            "wonByFold": self.won_by_fold,
            "players": players,
            "handNumber": self.hand_number,
            "gameOver": self.game_over,
            "winner": self.winner,
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        let Some(idx) = self.index_of(player_id) else { return };
        if self.phase == Phase::Betting || self.phase == Phase::Draw {
            self.players[idx].folded = true;
            self.pot.record_fold(&self.players[idx].id);
            let remaining = self.non_folded_indices();
            if remaining.len() <= 1 {
                self.won_by_fold = true;
                if let Some(&winner_idx) = remaining.first() {
                    self.award_uncontested_pot(winner_idx);
                }
                self.phase = Phase::Settlement;
                self.settle_eliminations();
                return;
            }
            if self.current_turn == Some(idx) {
                self.advance_betting(idx);
            }
        }
        self.players[idx].is_eliminated = true;
        self.settle_eliminations();
    }

    fn current_actor(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::VariantSelect => Some(self.players.get(self.dealer_index)?.id.clone()),
            Phase::WildSelect => Some(self.players.get(self.dealer_index)?.id.clone()),
            Phase::Betting | Phase::Draw => self.current_turn.and_then(|i| self.players.get(i)).map(|p| p.id.clone()),
            Phase::Ante | Phase::Showdown | Phase::Settlement => None,
        }
    }

    fn is_over(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(n: usize) -> PokerEngine {
        PokerEngine::new((0..n).map(|i| format!("p{i}")).collect())
    }

    #[test]
    fn variant_select_only_dealer() {
        let mut e = engine(2);
        let outcome = e.make_move("p1", Move::ChooseVariant { variant: PokerVariant::TexasHoldem });
        assert!(!outcome.valid);
    }

    #[test]
    fn holdem_skips_wild_select() {
        let mut e = engine(2);
        e.make_move("p0", Move::ChooseVariant { variant: PokerVariant::TexasHoldem });
        assert_eq!(e.phase, Phase::Ante);
    }

    #[test]
    fn draw_allows_wild_select() {
        let mut e = engine(2);
        e.make_move("p0", Move::ChooseVariant { variant: PokerVariant::FiveCardDraw });
        assert_eq!(e.phase, Phase::WildSelect);
    }

    #[test]
    fn buy_in_deals_five_cards_in_draw() {
        let mut e = engine(2);
        e.make_move("p0", Move::ChooseVariant { variant: PokerVariant::FiveCardDraw });
        e.make_move("p0", Move::ChooseWilds { wilds: vec![], last_card_down: None });
        e.make_move("p0", Move::BuyIn);
        assert_eq!(e.phase, Phase::Betting);
        assert_eq!(e.players[0].hand.len(), 5);
        assert_eq!(e.players[1].hand.len(), 5);
    }

    #[test]
    fn fold_heads_up_ends_hand_without_revealing() {
        let mut e = engine(2);
        e.make_move("p0", Move::ChooseVariant { variant: PokerVariant::TexasHoldem });
        e.make_move("p0", Move::BuyIn);
        let actor = e.current_actor().unwrap();
        e.make_move(&actor, Move::Fold);
        assert!(e.won_by_fold);
        assert_eq!(e.phase, Phase::Settlement);
        let viewer = if actor == "p0" { "p1" } else { "p0" };
        let state = e.get_state(viewer);
        let players = state["players"].as_array().unwrap();
        for p in players {
            if p["id"] != json!(viewer) {
                for card in p["hand"].as_array().unwrap() {
                    assert_eq!(card["suit"], "back");
                }
            }
        }
    }

    #[test]
    fn chip_conservation_through_a_full_heads_up_hand() {
        let mut e = engine(2);
        let total_before: u64 = e.players.iter().map(|p| p.chips).sum();
        e.make_move("p0", Move::ChooseVariant { variant: PokerVariant::TexasHoldem });
        e.make_move("p0", Move::BuyIn);
        loop {
            if e.phase == Phase::Settlement || e.is_over() {
                break;
            }
            let Some(actor) = e.current_actor() else { break };
            if e.phase == Phase::Draw {
                e.make_move(&actor, Move::StandPat);
            } else {
                e.make_move(&actor, Move::Call);
            }
        }
        let total_after: u64 = e.players.iter().map(|p| p.chips).sum::<u64>()
            + e.pot.get_total_pot();
        assert_eq!(total_before, total_after);
    }
}
