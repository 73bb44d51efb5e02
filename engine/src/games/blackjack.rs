//! Blackjack: up to 4 players against a dealer, blackjack pays 3:2
//!.

use crate::cards::{Card, Deck};
use crate::game::{GameEngine, Move, MoveOutcome};
use crate::PlayerId;
use serde_json::json;

const STARTING_CHIPS: u64 = 1000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Betting,
    Playing,
    DealerTurn,
    Settlement,
}

#[derive(Clone, Debug, Default)]
struct Hand {
    chips: u64,
    bet: u64,
    cards: Vec<Card>,
    done: bool,
    busted: bool,
    blackjack: bool,
    result: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct BlackjackEngine {
    players: Vec<PlayerId>,
    hands: Vec<Hand>,
    dealer: Vec<Card>,
    deck: Deck,
    phase: Phase,
    turn: usize,
}

fn hand_value(cards: &[Card]) -> (u32, bool) {
    let mut total = 0u32;
    let mut aces = 0u32;
    for c in cards {
        let v = match c.value {
            1 | 14 => {
                aces += 1;
                11
            }
            11 | 12 | 13 => 10,
            v => v as u32,
        };
        total += v;
    }
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    (total, aces > 0)
}

impl BlackjackEngine {
    #[must_use]
    pub fn new(player_ids: Vec<PlayerId>) -> Self {
        let hands = player_ids
            .iter()
            .map(|_| Hand { chips: STARTING_CHIPS, ..Hand::default() })
            .collect();
        let mut deck = Deck::standard();
        deck.shuffle();
        Self {
            players: player_ids,
            hands,
            dealer: Vec::new(),
            deck,
            phase: Phase::Betting,
            turn: 0,
        }
    }

    fn index_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player_id)
    }

    fn all_bets_placed(&self) -> bool {
        self.hands.iter().all(|h| h.bet > 0)
    }

    fn deal_round(&mut self) {
        for hand in &mut self.hands {
            hand.cards.clear();
            hand.cards.push(self.deck.deal().expect("deck reshuffled each round"));
            hand.cards.push(self.deck.deal().expect("deck reshuffled each round"));
            let (value, _) = hand_value(&hand.cards);
            hand.blackjack = value == 21;
            hand.done = hand.blackjack;
        }
        self.dealer.clear();
        self.dealer.push(self.deck.deal().expect("deck reshuffled each round"));
        self.dealer.push(self.deck.deal().expect("deck reshuffled each round"));
        self.phase = Phase::Playing;
        self.turn = 0;
        self.advance_to_next_active();
    }

    fn advance_to_next_active(&mut self) {
        while self.turn < self.hands.len() && self.hands[self.turn].done {
            self.turn += 1;
        }
        if self.turn >= self.hands.len() {
            self.run_dealer();
        }
    }

    fn run_dealer(&mut self) {
        self.phase = Phase::DealerTurn;
        if self.hands.iter().all(|h| h.busted || h.blackjack) {
            self.settle();
            return;
        }
        loop {
            let (value, soft) = hand_value(&self.dealer);
            if value > 21 || value > 17 || (value == 17 && !soft) {
                break;
            }
            self.dealer.push(self.deck.deal().expect("deck reshuffled each round"));
        }
        self.settle();
    }

    fn settle(&mut self) {
        let (dealer_value, _) = hand_value(&self.dealer);
        let dealer_bust = dealer_value > 21;
        let dealer_blackjack = self.dealer.len() == 2 && dealer_value == 21;
        for hand in &mut self.hands {
            let (value, _) = hand_value(&hand.cards);
            hand.result = Some(if hand.busted {
                "lose"
            } else if hand.blackjack && !dealer_blackjack {
                hand.chips += hand.bet + hand.bet * 3 / 2;
                "blackjack"
            } else if hand.blackjack && dealer_blackjack {
                hand.chips += hand.bet;
                "push"
            } else if dealer_bust || value > dealer_value {
                hand.chips += hand.bet * 2;
                "win"
            } else if value == dealer_value {
                hand.chips += hand.bet;
                "push"
            } else {
                "lose"
            });
        }
        self.phase = Phase::Settlement;
    }

    fn next_hand(&mut self) {
        for hand in &mut self.hands {
            hand.bet = 0;
            hand.cards.clear();
            hand.done = false;
            hand.busted = false;
            hand.blackjack = false;
            hand.result = None;
        }
        self.dealer.clear();
        self.deck = Deck::standard();
        self.deck.shuffle();
        self.phase = Phase::Betting;
        self.turn = 0;
    }
}

impl GameEngine for BlackjackEngine {
    fn make_move(&mut self, player_id: &str, mv: Move) -> MoveOutcome {
        let Some(idx) = self.index_of(player_id) else {
            return MoveOutcome::invalid("Unknown player.");
        };
        match mv {
            Move::PlaceBet { amount } => {
                if self.phase != Phase::Betting {
                    return MoveOutcome::invalid("Betting is closed.");
                }
                if amount == 0 || amount > self.hands[idx].chips {
                    return MoveOutcome::invalid("Invalid bet amount.");
                }
                self.hands[idx].bet = amount;
                self.hands[idx].chips -= amount;
                if self.all_bets_placed() {
                    self.deal_round();
                }
                MoveOutcome::ok(None)
            }
            Move::Hit => {
                if self.phase != Phase::Playing || self.turn != idx {
                    return MoveOutcome::invalid("It's not your turn.");
                }
                let card = self.deck.deal().expect("deck has cards mid-round");
                self.hands[idx].cards.push(card);
                let (value, _) = hand_value(&self.hands[idx].cards);
                if value > 21 {
                    self.hands[idx].busted = true;
                    self.hands[idx].done = true;
                    self.advance_to_next_active();
                }
                MoveOutcome::ok(Some(json!({ "value": value })))
            }
            Move::Stand => {
                if self.phase != Phase::Playing || self.turn != idx {
                    return MoveOutcome::invalid("It's not your turn.");
                }
                self.hands[idx].done = true;
                self.advance_to_next_active();
                MoveOutcome::ok(None)
            }
            Move::Double => {
                if self.phase != Phase::Playing || self.turn != idx {
                    return MoveOutcome::invalid("It's not your turn.");
                }
                if self.hands[idx].cards.len() != 2 {
                    return MoveOutcome::invalid("Can only double on your first decision.");
                }
                if self.hands[idx].bet > self.hands[idx].chips {
                    return MoveOutcome::invalid("Not enough chips to double.");
                }
                self.hands[idx].chips -= self.hands[idx].bet;
                self.hands[idx].bet *= 2;
                let card = self.deck.deal().expect("deck has cards mid-round");
                self.hands[idx].cards.push(card);
                let (value, _) = hand_value(&self.hands[idx].cards);
                self.hands[idx].busted = value > 21;
                self.hands[idx].done = true;
                self.advance_to_next_active();
                MoveOutcome::ok(Some(json!({ "value": value })))
            }
            Move::NextHand => {
                if self.phase != Phase::Settlement {
                    return MoveOutcome::invalid("The round isn't over yet.");
                }
                self.next_hand();
                MoveOutcome::ok(None)
            }
            _ => MoveOutcome::invalid("Not a Blackjack move."),
        }
    }

    fn get_state(&self, viewer_id: &str) -> serde_json::Value {
        let idx = self.index_of(viewer_id);
        let dealer_hidden = self.phase == Phase::Playing || self.phase == Phase::Betting;
        let dealer_view: Vec<_> = self
            .dealer
            .iter()
            .enumerate()
            .map(|(i, c)| if i == 1 && dealer_hidden { crate::cards::CardView::back() } else { c.to_view(false) })
            .collect();
        let hands: Vec<_> = self
            .hands
            .iter()
            .enumerate()
            .map(|(i, h)| {
                json!({
                    "chips": h.chips,
                    "bet": h.bet,
                    "cards": h.cards.iter().map(|c| c.to_view(false)).collect::<Vec<_>>(),
                    "value": hand_value(&h.cards).0,
                    "done": h.done,
                    "busted": h.busted,
                    "blackjack": h.blackjack,
                    "result": h.result,
                    "isYou": Some(i) == idx,
                })
            })
            .collect();
        json!({
            "phase": match self.phase {
                Phase::Betting => "betting",
                Phase::Playing => "playing",
                Phase::DealerTurn => "dealer-turn",
                Phase::Settlement => "settlement",
            },
            "dealer": dealer_view,
            "hands": hands,
            "currentPlayer": self.players.get(self.turn),
        })
    }

    fn remove_player(&mut self, player_id: &str) {
        let Some(idx) = self.index_of(player_id) else { return };
        self.hands[idx].done = true;
        self.hands[idx].busted = true;
        if self.phase == Phase::Playing && self.turn == idx {
            self.advance_to_next_active();
        }
    }

    fn current_actor(&self) -> Option<PlayerId> {
        if self.phase == Phase::Playing {
            self.players.get(self.turn).cloned()
        } else {
            None
        }
    }

    fn is_over(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    #[test]
    fn hand_value_counts_soft_ace_as_eleven() {
        let cards = [Card::new(14, Suit::Clubs), Card::new(6, Suit::Hearts)];
        assert_eq!(hand_value(&cards), (17, true));
    }

    #[test]
    fn hand_value_downgrades_ace_on_bust() {
        let cards = [Card::new(14, Suit::Clubs), Card::new(9, Suit::Hearts), Card::new(5, Suit::Spades)];
        assert_eq!(hand_value(&cards), (15, false));
    }

    #[test]
    fn betting_transitions_to_playing_once_all_bet() {
        let mut e = BlackjackEngine::new(vec!["a".into(), "b".into()]);
        e.make_move("a", Move::PlaceBet { amount: 10 });
        assert_eq!(e.phase, Phase::Betting);
        e.make_move("b", Move::PlaceBet { amount: 10 });
        assert_ne!(e.phase, Phase::Betting);
    }

    #[test]
    fn double_requires_exactly_two_cards() {
        let mut e = BlackjackEngine::new(vec!["a".into()]);
        e.make_move("a", Move::PlaceBet { amount: 10 });
        if e.phase == Phase::Playing {
            e.hands[0].cards.push(Card::new(2, Suit::Clubs));
            let outcome = e.make_move("a", Move::Double);
            assert!(!outcome.valid);
        }
    }
}
