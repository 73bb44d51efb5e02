//! Pot manager: side-pot accounting for a single Poker hand.
//!
//! A pot tracks an amount plus the set of players still eligible to win it;
//! side pots fall out of splitting the accumulated bets at each all-in
//! threshold, split into an accumulate-then-query pass so the engine can
//! build the full side-pot list once betting closes and then walk it
//! independently of the accumulation logic during showdown.

use crate::PlayerId;
use std::collections::HashSet;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pot {
    pub amount: u64,
    pub eligible: Vec<PlayerId>,
}

#[derive(Clone, Debug, Default)]
pub struct PotManager {
    players: Vec<PlayerId>,
    contributions: Vec<(PlayerId, u64)>,
    folded: HashSet<PlayerId>,
    all_in: HashSet<PlayerId>,
}

impl PotManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_players(&mut self, players: Vec<PlayerId>) {
        self.reset();
        self.players = players;
    }

    pub fn reset(&mut self) {
        self.contributions.clear();
        self.folded.clear();
        self.all_in.clear();
    }

    pub fn record_bet(&mut self, player: &PlayerId, amount: u64) {
        if let Some((_, total)) = self.contributions.iter_mut().find(|(p, _)| p == player) {
            *total += amount;
        } else {
            self.contributions.push((player.clone(), amount));
        }
    }

    pub fn record_fold(&mut self, player: &PlayerId) {
        self.folded.insert(player.clone());
    }

    pub fn record_all_in(&mut self, player: &PlayerId) {
        self.all_in.insert(player.clone());
    }

    #[must_use]
    pub fn get_total_pot(&self) -> u64 {
        self.contributions.iter().map(|(_, a)| *a).sum()
    }

    fn amount_of(&self, player: &PlayerId) -> u64 {
        self.contributions
            .iter()
            .find(|(p, _)| p == player)
            .map_or(0, |(_, a)| *a)
    }

    /// Builds side pots from the ascending distinct commitment levels of
    /// non-folded all-in players.
    #[must_use]
    pub fn calculate_pots(&self) -> Vec<Pot> {
        let mut levels: Vec<u64> = self
            .all_in
            .iter()
            .filter(|p| !self.folded.contains(*p))
            .map(|p| self.amount_of(p))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        levels.sort_unstable();

        let mut pots = Vec::new();
        let mut prev = 0u64;

        for level in levels {
            let mut amount = 0u64;
            for (p, total) in &self.contributions {
                let _ = p;
                amount += (level - prev).min(total.saturating_sub(prev));
            }
            let eligible: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| !self.folded.contains(*p) && self.amount_of(p) >= level)
                .cloned()
                .collect();
            if amount > 0 {
                pots.push(Pot { amount, eligible });
            }
            prev = level;
        }

        let excess: u64 = self
            .contributions
            .iter()
            .map(|(_, total)| total.saturating_sub(prev))
            .sum();
        if excess > 0 {
            let eligible: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| !self.folded.contains(*p) && self.amount_of(p) > prev)
                .cloned()
                .collect();
            pots.push(Pot {
                amount: excess,
                eligible,
            });
        }

        if pots.is_empty() {
            let amount = self.get_total_pot();
            if amount > 0 {
                let eligible: Vec<PlayerId> = self
                    .players
                    .iter()
                    .filter(|p| !self.folded.contains(*p))
                    .cloned()
                    .collect();
                pots.push(Pot { amount, eligible });
            }
        }

        pots
    }
}

/// Split `pot.amount` evenly across `winners` (iteration order), assigning
/// any remainder to the first winner.
#[must_use]
pub fn distribute(pot: &Pot, winners: &[PlayerId]) -> Vec<(PlayerId, u64)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let share = pot.amount / winners.len() as u64;
    let remainder = pot.amount % winners.len() as u64;
    winners
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), share + if i == 0 { remainder } else { 0 }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PlayerId {
        s.to_string()
    }

    #[test]
    fn no_all_ins_yields_single_pot() {
        let mut pm = PotManager::new();
        pm.set_players(vec![pid("a"), pid("b")]);
        pm.record_bet(&pid("a"), 50);
        pm.record_bet(&pid("b"), 50);
        let pots = pm.calculate_pots();
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 100);
        assert_eq!(pots[0].eligible.len(), 2);
    }

    #[test]
    fn three_way_all_in_side_pots_match_spec_example() {
        let mut pm = PotManager::new();
        pm.set_players(vec![pid("short"), pid("mid"), pid("big")]);
        pm.record_bet(&pid("short"), 100);
        pm.record_bet(&pid("mid"), 200);
        pm.record_bet(&pid("big"), 500);
        pm.record_all_in(&pid("short"));
        pm.record_all_in(&pid("mid"));
        pm.record_all_in(&pid("big"));

        let pots = pm.calculate_pots();
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible.len(), 3);
        assert_eq!(pots[1].amount, 200);
        assert_eq!(pots[1].eligible.len(), 2);
        assert_eq!(pots[2].amount, 300);
        assert_eq!(pots[2].eligible, vec![pid("big")]);
    }

    #[test]
    fn folded_players_never_eligible() {
        let mut pm = PotManager::new();
        pm.set_players(vec![pid("a"), pid("b")]);
        pm.record_bet(&pid("a"), 100);
        pm.record_bet(&pid("b"), 100);
        pm.record_fold(&pid("b"));
        let pots = pm.calculate_pots();
        for pot in &pots {
            assert!(!pot.eligible.contains(&pid("b")));
        }
    }

    #[test]
    fn total_across_pots_matches_total_pot() {
        let mut pm = PotManager::new();
        pm.set_players(vec![pid("a"), pid("b"), pid("c")]);
        pm.record_bet(&pid("a"), 30);
        pm.record_bet(&pid("b"), 80);
        pm.record_bet(&pid("c"), 80);
        pm.record_all_in(&pid("a"));
        let pots = pm.calculate_pots();
        let sum: u64 = pots.iter().map(|p| p.amount).sum();
        assert_eq!(sum, pm.get_total_pot());
    }

    #[test]
    fn distribute_gives_remainder_to_first_winner() {
        let pot = Pot {
            amount: 101,
            eligible: vec![pid("a"), pid("b")],
        };
        let shares = distribute(&pot, &pot.eligible.clone());
        assert_eq!(shares[0].1, 51);
        assert_eq!(shares[1].1, 50);
    }

    #[test]
    fn reset_clears_all_accumulators() {
        let mut pm = PotManager::new();
        pm.set_players(vec![pid("a")]);
        pm.record_bet(&pid("a"), 10);
        pm.record_fold(&pid("a"));
        pm.reset();
        assert_eq!(pm.get_total_pot(), 0);
        assert!(pm.calculate_pots().is_empty());
    }
}
