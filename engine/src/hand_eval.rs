//! Pure poker hand evaluation: ranking, best-of-N, and wild-card substitution.
//!
//! Hand strength is the one place raw throughput matters (see
//! `benches/hand_evaluation.rs`), so the rank enum is ordered low-to-high
//! and comparisons fall out of plain `Ord` rather than a scoring function;
//! wild substitution is a case split over which `WildSpec` a card matches,
//! tiebreakers expressed as a descending value list per rank.

use crate::cards::{Card, Suit, Value, ACE};
use crate::errors::EngineError;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
    FiveOfAKind = 10,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandRank {
    pub rank: Rank,
    pub tiebreakers: Vec<Value>,
}

impl HandRank {
    fn new(rank: Rank, tiebreakers: Vec<Value>) -> Self {
        Self { rank, tiebreakers }
    }
}

/// Lexicographic over `(rank, tiebreakers)`.
#[must_use]
pub fn compare_hands(a: &HandRank, b: &HandRank) -> Ordering {
    (a.rank as u8)
        .cmp(&(b.rank as u8))
        .then_with(|| a.tiebreakers.cmp(&b.tiebreakers))
}

/// One of the five wild specifications a Poker dealer may choose.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WildSpec {
    Jokers,
    OneEyedJacks,
    SuicideKing,
    Deuces,
    Rank(Value),
}

impl WildSpec {
    fn matches(self, card: Card) -> bool {
        match self {
            Self::Jokers => card.is_joker(),
            Self::OneEyedJacks => {
                card.value == 11 && matches!(card.suit, Suit::Spades | Suit::Hearts)
            }
            Self::SuicideKing => card.value == 13 && card.suit == Suit::Hearts,
            Self::Deuces => card.value == 2,
            Self::Rank(r) => card.value == r || (r == ACE && card.value == 1),
        }
    }
}

#[must_use]
pub fn is_wild(card: Card, wilds: &[WildSpec]) -> bool {
    wilds.iter().any(|w| w.matches(card))
}

/// Evaluate exactly 5 cards. Fails when `cards.len() != 5`.
pub fn evaluate_hand(cards: &[Card]) -> Result<HandRank, EngineError> {
    if cards.len() != 5 {
        return Err(EngineError::IllegalMove(format!(
            "evaluateHand requires exactly 5 cards, got {}",
            cards.len()
        )));
    }
    Ok(evaluate_5(cards))
}

fn evaluate_5(cards: &[Card]) -> HandRank {
    let mut counts: HashMap<Value, u8> = HashMap::new();
    for c in cards {
        *counts.entry(c.value).or_insert(0) += 1;
    }

    let mut groups: Vec<(u8, Value)> = counts.into_iter().map(|(v, n)| (n, v)).collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);

    let mut distinct_values: Vec<Value> = groups.iter().map(|g| g.1).collect();
    distinct_values.sort_unstable_by(|a, b| b.cmp(a));

    let straight_high = straight_high_card(&distinct_values);

    match (groups[0].0, groups.get(1).map(|g| g.0)) {
        (5, _) => HandRank::new(Rank::FiveOfAKind, vec![groups[0].1]),
        (4, _) => HandRank::new(Rank::FourOfAKind, vec![groups[0].1, groups[1].1]),
        (3, Some(2)) => HandRank::new(Rank::FullHouse, vec![groups[0].1, groups[1].1]),
        _ if is_flush && straight_high == Some(ACE) => HandRank::new(Rank::RoyalFlush, vec![ACE]),
        _ if is_flush && straight_high.is_some() => {
            HandRank::new(Rank::StraightFlush, vec![straight_high.unwrap()])
        }
        (3, _) => {
            let kickers: Vec<Value> = groups[1..].iter().map(|g| g.1).collect();
            let mut tb = vec![groups[0].1];
            tb.extend(kickers);
            HandRank::new(Rank::ThreeOfAKind, tb)
        }
        _ if is_flush => {
            HandRank::new(Rank::Flush, distinct_values)
        }
        _ if straight_high.is_some() => {
            HandRank::new(Rank::Straight, vec![straight_high.unwrap()])
        }
        (2, Some(2)) => {
            let kicker = groups[2].1;
            HandRank::new(Rank::TwoPair, vec![groups[0].1, groups[1].1, kicker])
        }
        (2, _) => {
            let mut tb = vec![groups[0].1];
            tb.extend(groups[1..].iter().map(|g| g.1));
            HandRank::new(Rank::OnePair, tb)
        }
        _ => HandRank::new(Rank::HighCard, distinct_values),
    }
}

/// Returns the straight's high card, handling the ace-low wheel (A-2-3-4-5 → 5).
fn straight_high_card(distinct_desc: &[Value]) -> Option<Value> {
    if distinct_desc.len() != 5 {
        return None;
    }
    let consecutive = distinct_desc.windows(2).all(|w| w[0] == w[1] + 1);
    if consecutive {
        return Some(distinct_desc[0]);
    }
    if distinct_desc == [ACE, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

/// Evaluate all C(n,5) five-card subsets of `cards` and return the best.
pub fn evaluate_best_hand(cards: &[Card]) -> Result<HandRank, EngineError> {
    if cards.len() < 5 {
        return Err(EngineError::IllegalMove(format!(
            "evaluateBestHand requires at least 5 cards, got {}",
            cards.len()
        )));
    }
    let mut best: Option<HandRank> = None;
    for combo in combinations(cards.len(), 5) {
        let hand: Vec<Card> = combo.iter().map(|&i| cards[i]).collect();
        let rank = evaluate_5(&hand);
        best = Some(match best {
            None => rank,
            Some(current) if compare_hands(&rank, &current) == Ordering::Greater => rank,
            Some(current) => current,
        });
    }
    Ok(best.expect("at least one 5-combination exists"))
}

/// Index combinations of `k` out of `n`, smallest-first.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut combo: Vec<usize> = (0..k).collect();
    if k > n {
        return result;
    }
    loop {
        result.push(combo.clone());
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if combo[i] != i + n - k {
                break;
            }
            if i == 0 {
                return result;
            }
        }
        combo[i] += 1;
        for j in i + 1..k {
            combo[j] = combo[j - 1] + 1;
        }
    }
}

/// Full 52-card universe, used for exhaustive wild substitution.
fn card_universe() -> Vec<Card> {
    let mut out = Vec::with_capacity(52);
    for suit in [Suit::Clubs, Suit::Spades, Suit::Diamonds, Suit::Hearts] {
        for value in 2..=14 {
            out.push(Card::new(value, suit));
        }
    }
    out
}

/// Evaluate a 5-card hand with wild substitution.
pub fn evaluate_hand_with_wilds(cards: &[Card], wilds: &[WildSpec]) -> Result<HandRank, EngineError> {
    if cards.len() != 5 {
        return Err(EngineError::IllegalMove(format!(
            "evaluateHandWithWilds requires exactly 5 cards, got {}",
            cards.len()
        )));
    }
    if wilds.is_empty() {
        return Ok(evaluate_5(cards));
    }

    let (wild_cards, naturals): (Vec<Card>, Vec<Card>) =
        cards.iter().partition(|c| is_wild(**c, wilds));
    let w = wild_cards.len();

    match w {
        5 => Ok(HandRank::new(Rank::FiveOfAKind, vec![ACE])),
        4 => {
            let v = normalize_ace(naturals[0].value);
            Ok(HandRank::new(Rank::FiveOfAKind, vec![v]))
        }
        3 => {
            let mut vs: Vec<Value> = naturals.iter().map(|c| normalize_ace(c.value)).collect();
            vs.sort_unstable_by(|a, b| b.cmp(a));
            if vs[0] == vs[1] {
                Ok(HandRank::new(Rank::FiveOfAKind, vec![vs[0]]))
            } else {
                Ok(HandRank::new(Rank::FourOfAKind, vec![vs[0], vs[1]]))
            }
        }
        1 | 2 => {
            let universe = card_universe();
            let mut best: Option<HandRank> = None;
            substitute_and_evaluate(&naturals, w, &universe, &mut best);
            Ok(best.expect("substitution search always finds a hand"))
        }
        0 => Ok(evaluate_5(cards)),
        _ => unreachable!("a 5-card hand has at most 5 wilds"),
    }
}

fn normalize_ace(v: Value) -> Value {
    if v == 1 { ACE } else { v }
}

fn substitute_and_evaluate(
    naturals: &[Card],
    remaining_wilds: usize,
    universe: &[Card],
    best: &mut Option<HandRank>,
) {
    if remaining_wilds == 0 {
        let rank = evaluate_5(naturals);
        *best = Some(match best.take() {
            None => rank,
            Some(current) if compare_hands(&rank, &current) == Ordering::Greater => rank,
            Some(current) => current,
        });
        return;
    }
    for &candidate in universe {
        let mut hand = naturals.to_vec();
        hand.push(candidate);
        substitute_and_evaluate(&hand, remaining_wilds - 1, universe, best);
    }
}

/// Best 5-of-N with wild substitution: tries every 5-subset, resolving wilds
/// within each, and keeps the overall maximum. Used by Stud/Hold'em showdown
/// (best-5-of-7) when wilds are in play.
pub fn evaluate_best_hand_with_wilds(
    cards: &[Card],
    wilds: &[WildSpec],
) -> Result<HandRank, EngineError> {
    if wilds.is_empty() {
        return evaluate_best_hand(cards);
    }
    if cards.len() < 5 {
        return Err(EngineError::IllegalMove(format!(
            "evaluateBestHand requires at least 5 cards, got {}",
            cards.len()
        )));
    }
    let mut best: Option<HandRank> = None;
    for combo in combinations(cards.len(), 5) {
        let hand: Vec<Card> = combo.iter().map(|&i| cards[i]).collect();
        let rank = evaluate_hand_with_wilds(&hand, wilds)?;
        best = Some(match best {
            None => rank,
            Some(current) if compare_hands(&rank, &current) == Ordering::Greater => rank,
            Some(current) => current,
        });
    }
    Ok(best.expect("at least one 5-combination exists"))
}

/// Winners among `(player_id, hand)` pairs: every player whose hand compares
/// equal to the maximum.
#[must_use]
pub fn determine_winners<'a, P: Clone + Eq>(
    hands: &'a [(P, HandRank)],
) -> (Vec<P>, &'a HandRank) {
    let best = hands
        .iter()
        .max_by(|a, b| compare_hands(&a.1, &b.1))
        .map(|(_, r)| r)
        .expect("determineWinners requires at least one hand");
    let winners = hands
        .iter()
        .filter(|(_, r)| compare_hands(r, best) == Ordering::Equal)
        .map(|(p, _)| p.clone())
        .collect();
    (winners, best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit::*;

    fn c(value: Value, suit: Suit) -> Card {
        Card::new(value, suit)
    }

    #[test]
    fn rejects_wrong_length() {
        let cards = [c(2, Clubs), c(3, Clubs)];
        assert!(evaluate_hand(&cards).is_err());
    }

    #[test]
    fn detects_royal_flush() {
        let cards = [c(ACE, Hearts), c(13, Hearts), c(12, Hearts), c(11, Hearts), c(10, Hearts)];
        let r = evaluate_hand(&cards).unwrap();
        assert_eq!(r.rank, Rank::RoyalFlush);
    }

    #[test]
    fn detects_ace_low_straight() {
        let cards = [c(ACE, Clubs), c(2, Hearts), c(3, Spades), c(4, Diamonds), c(5, Clubs)];
        let r = evaluate_hand(&cards).unwrap();
        assert_eq!(r.rank, Rank::Straight);
        assert_eq!(r.tiebreakers, vec![5]);
    }

    #[test]
    fn detects_ace_low_straight_flush_reports_five_high() {
        let cards = [c(ACE, Hearts), c(2, Hearts), c(3, Hearts), c(4, Hearts), c(5, Hearts)];
        let r = evaluate_hand(&cards).unwrap();
        assert_eq!(r.rank, Rank::StraightFlush);
        assert_eq!(r.tiebreakers, vec![5]);
    }

    #[test]
    fn full_house_tiebreakers_trips_then_pair() {
        let cards = [c(5, Clubs), c(5, Hearts), c(5, Spades), c(9, Diamonds), c(9, Clubs)];
        let r = evaluate_hand(&cards).unwrap();
        assert_eq!(r.rank, Rank::FullHouse);
        assert_eq!(r.tiebreakers, vec![5, 9]);
    }

    #[test]
    fn compare_hands_is_reflexive_and_antisymmetric() {
        let a = evaluate_hand(&[c(2, Clubs), c(3, Hearts), c(7, Spades), c(9, Diamonds), c(11, Clubs)]).unwrap();
        let b = evaluate_hand(&[c(ACE, Hearts), c(13, Hearts), c(12, Hearts), c(11, Hearts), c(10, Hearts)]).unwrap();
        assert_eq!(compare_hands(&a, &a), Ordering::Equal);
        assert_eq!(compare_hands(&a, &b), Ordering::Less);
        assert_eq!(compare_hands(&b, &a), Ordering::Greater);
    }

    #[test]
    fn wild_substitution_never_decreases_hand_strength() {
        let cards = [c(2, Clubs), c(3, Hearts), c(7, Spades), c(9, Diamonds), c(2, Hearts)];
        let plain = evaluate_hand(&cards).unwrap();
        let wild = evaluate_hand_with_wilds(&cards, &[WildSpec::Deuces]).unwrap();
        assert_ne!(compare_hands(&wild, &plain), Ordering::Less);
    }

    #[test]
    fn four_wilds_plus_one_natural_is_five_of_a_kind() {
        let cards = [
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(9, Clubs),
        ];
        let r = evaluate_hand_with_wilds(&cards, &[WildSpec::Jokers]).unwrap();
        assert_eq!(r.rank, Rank::FiveOfAKind);
        assert_eq!(r.tiebreakers, vec![9]);
    }

    #[test]
    fn three_wilds_two_matching_naturals_is_five_of_a_kind() {
        let cards = [
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(9, Clubs),
            c(9, Hearts),
        ];
        let r = evaluate_hand_with_wilds(&cards, &[WildSpec::Jokers]).unwrap();
        assert_eq!(r.rank, Rank::FiveOfAKind);
    }

    #[test]
    fn three_wilds_two_distinct_naturals_is_four_of_a_kind() {
        let cards = [
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(0, Suit::Joker),
            c(9, Clubs),
            c(4, Hearts),
        ];
        let r = evaluate_hand_with_wilds(&cards, &[WildSpec::Jokers]).unwrap();
        assert_eq!(r.rank, Rank::FourOfAKind);
        assert_eq!(r.tiebreakers, vec![9, 4]);
    }

    #[test]
    fn determine_winners_splits_ties() {
        let a = evaluate_hand(&[c(2, Clubs), c(3, Hearts), c(7, Spades), c(9, Diamonds), c(11, Clubs)]).unwrap();
        let b = evaluate_hand(&[c(2, Hearts), c(3, Spades), c(7, Diamonds), c(9, Clubs), c(11, Hearts)]).unwrap();
        let hands = vec![("p1".to_string(), a), ("p2".to_string(), b)];
        let (winners, _) = determine_winners(&hands);
        assert_eq!(winners.len(), 2);
    }

    #[test]
    fn combinations_count_matches_binomial() {
        assert_eq!(combinations(7, 5).len(), 21);
        assert_eq!(combinations(5, 5).len(), 1);
    }
}
