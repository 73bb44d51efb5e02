//! Card and deck primitives shared by every card-driven engine (Poker, War).
//!
//! A card is a raw numeric value plus a suit, aces stored high (14) so
//! comparisons don't need special-casing, with ace-low straights detected
//! explicitly by the evaluator.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Spades,
    Diamonds,
    Hearts,
    /// Only jokers carry this suit.
    Joker,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Spades => "♠",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Joker => "🃏",
        };
        write!(f, "{repr}")
    }
}

/// Raw card value. Aces are stored high (14); ace-low straights are a
/// special case the evaluator checks explicitly. 0 marks a joker.
pub type Value = u8;

pub const JOKER: Value = 0;
pub const ACE: Value = 14;
pub const ACE_LOW: Value = 1;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub value: Value,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub fn new(value: Value, suit: Suit) -> Self {
        Self { value, suit }
    }

    #[must_use]
    pub fn joker() -> Self {
        Self {
            value: JOKER,
            suit: Suit::Joker,
        }
    }

    #[must_use]
    pub fn is_joker(&self) -> bool {
        self.value == JOKER
    }

    /// Render the low-or-high-ace-agnostic display value, e.g. "A", "10", "K".
    #[must_use]
    pub fn value_str(&self) -> &'static str {
        match self.value {
            JOKER => "Joker",
            1 | 14 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            _ => "?",
        }
    }

    /// The wire projection of this card, as seen by a viewer entitled to see it.
    #[must_use]
    pub fn to_view(&self, face_down: bool) -> CardView {
        CardView {
            suit: self.suit_str().to_string(),
            value: self.value_str().to_string(),
            face_down,
        }
    }
}

impl Card {
    fn suit_str(&self) -> &'static str {
        match self.suit {
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Joker => "joker",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value_str(), self.suit)
    }
}

/// The wire shape: `{suit, value, faceDown?}`. An unknown
/// face-down card is rendered as the literal `{suit:"back", value:"back"}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CardView {
    pub suit: String,
    pub value: String,
    #[serde(rename = "faceDown", skip_serializing_if = "std::ops::Not::not", default)]
    pub face_down: bool,
}

impl CardView {
    #[must_use]
    pub fn back() -> Self {
        Self {
            suit: "back".to_string(),
            value: "back".to_string(),
            face_down: true,
        }
    }
}

/// A 52-card deck, optionally extended with jokers. Deals from the front;
/// `shuffle` resets the cursor.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

impl Deck {
    #[must_use]
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in [Suit::Clubs, Suit::Spades, Suit::Diamonds, Suit::Hearts] {
            for value in ACE_LOW..=13 {
                cards.push(Card::new(if value == 1 { ACE } else { value }, suit));
            }
        }
        Self { cards, cursor: 0 }
    }

    /// A standard deck plus `n` jokers.
    #[must_use]
    pub fn with_jokers(n: usize) -> Self {
        let mut deck = Self::standard();
        for _ in 0..n {
            deck.cards.push(Card::joker());
        }
        deck
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.cursor = 0;
    }

    /// Returns `None` once the deck is exhausted.
    pub fn deal(&mut self) -> Option<Card> {
        let card = self.cards.get(self.cursor).copied();
        if card.is_some() {
            self.cursor += 1;
        }
        card
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.cards.len(), 52);
        let mut seen = std::collections::HashSet::new();
        for card in &deck.cards {
            assert!(seen.insert((card.value, card.suit)));
        }
    }

    #[test]
    fn with_jokers_adds_exactly_n() {
        let deck = Deck::with_jokers(2);
        assert_eq!(deck.cards.len(), 54);
        assert_eq!(deck.cards.iter().filter(|c| c.is_joker()).count(), 2);
    }

    #[test]
    fn deal_advances_cursor_and_exhausts() {
        let mut deck = Deck::standard();
        for i in 1..=52 {
            assert!(deck.deal().is_some());
            assert_eq!(deck.remaining(), 52 - i);
        }
        assert!(deck.deal().is_none());
    }

    #[test]
    fn shuffle_resets_cursor() {
        let mut deck = Deck::standard();
        deck.deal();
        deck.deal();
        deck.shuffle();
        assert_eq!(deck.cursor, 0);
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn card_back_view_hides_identity() {
        let view = CardView::back();
        assert_eq!(view.suit, "back");
        assert_eq!(view.value, "back");
        assert!(view.face_down);
    }

    #[test]
    fn ace_displays_as_a_whether_high_or_low() {
        let low = Card::new(ACE_LOW, Suit::Spades);
        let high = Card::new(ACE, Suit::Spades);
        assert_eq!(low.value_str(), "A");
        assert_eq!(high.value_str(), "A");
    }
}
