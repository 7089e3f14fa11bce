//! Stat-sum battle between two equal-length rosters.

use serde::{Deserialize, Serialize};

use crate::catalog::{display_name, Entry};
use crate::roster::Side;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Side(Side),
    Tie,
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum BattleError {
    #[error(
        "both sides need at least one pokemon and the same count (side A: {side_a}, side B: {side_b})"
    )]
    InvalidRosterPairing { side_a: usize, side_b: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairOutcome {
    pub index: usize,
    pub name_a: String,
    pub name_b: String,
    pub power_a: u32,
    pub power_b: u32,
    pub winner: Winner,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub a: usize,
    pub b: usize,
    pub ties: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub pairs: Vec<PairOutcome>,
    pub tally: Tally,
    pub winner: Winner,
}

/// Pair `side_a[i]` with `side_b[i]`; the higher stat sum takes the pair.
pub fn resolve(side_a: &[&Entry], side_b: &[&Entry]) -> Result<BattleResult, BattleError> {
    if side_a.is_empty() || side_b.is_empty() || side_a.len() != side_b.len() {
        return Err(BattleError::InvalidRosterPairing {
            side_a: side_a.len(),
            side_b: side_b.len(),
        });
    }

    let mut tally = Tally::default();
    let pairs = side_a
        .iter()
        .zip(side_b)
        .enumerate()
        .map(|(index, (a, b))| {
            let (power_a, power_b) = (a.power(), b.power());
            let winner = compare(power_a, power_b);
            match winner {
                Winner::Side(Side::A) => tally.a += 1,
                Winner::Side(Side::B) => tally.b += 1,
                Winner::Tie => tally.ties += 1,
            }
            PairOutcome {
                index,
                name_a: a.name.clone(),
                name_b: b.name.clone(),
                power_a,
                power_b,
                winner,
            }
        })
        .collect();

    Ok(BattleResult {
        pairs,
        winner: compare(tally.a as u32, tally.b as u32),
        tally,
    })
}

fn compare(a: u32, b: u32) -> Winner {
    match a.cmp(&b) {
        std::cmp::Ordering::Greater => Winner::Side(Side::A),
        std::cmp::Ordering::Less => Winner::Side(Side::B),
        std::cmp::Ordering::Equal => Winner::Tie,
    }
}

impl BattleResult {
    /// One line per pair followed by the overall verdict.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .pairs
            .iter()
            .map(|pair| {
                let (a, b) = (display_name(&pair.name_a), display_name(&pair.name_b));
                match pair.winner {
                    Winner::Side(Side::A) => format!("{a} beat {b}!"),
                    Winner::Side(Side::B) => format!("{b} beat {a}!"),
                    Winner::Tie => format!("{a} and {b} are tied!"),
                }
            })
            .collect();
        lines.push(String::new());
        lines.push(match self.winner {
            Winner::Side(side) => format!("{side} wins!"),
            Winner::Tie => "Both sides are tied!".to_string(),
        });
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Stat;
    use pretty_assertions::assert_eq;

    fn fighter(name: &str, total: u16) -> Entry {
        Entry {
            id: 1,
            name: name.to_string(),
            height: 1,
            weight: 1,
            types: Vec::new(),
            stats: vec![
                Stat {
                    name: "hp".to_string(),
                    base_value: total / 2,
                },
                Stat {
                    name: "speed".to_string(),
                    base_value: total - total / 2,
                },
            ],
            sprite: None,
        }
    }

    #[test]
    fn higher_sum_wins_single_pair() {
        let (a, b) = (fighter("venusaur", 300), fighter("pidgey", 250));
        let result = resolve(&[&a], &[&b]).unwrap();

        assert_eq!(result.pairs[0].winner, Winner::Side(Side::A));
        assert_eq!(result.winner, Winner::Side(Side::A));
        assert_eq!(result.tally, Tally { a: 1, b: 0, ties: 0 });
    }

    #[test]
    fn equal_sums_tie() {
        let (a, b) = (fighter("ditto", 288), fighter("eevee", 288));
        let result = resolve(&[&a, &a], &[&b, &b]).unwrap();

        assert!(result.pairs.iter().all(|pair| pair.winner == Winner::Tie));
        assert_eq!(result.winner, Winner::Tie);
        assert_eq!(result.tally.ties, 2);
    }

    #[test]
    fn equal_pair_wins_is_overall_tie() {
        let strong = fighter("mewtwo", 680);
        let weak = fighter("magikarp", 200);
        let result = resolve(&[&strong, &weak], &[&weak, &strong]).unwrap();

        assert_eq!(result.tally, Tally { a: 1, b: 1, ties: 0 });
        assert_eq!(result.winner, Winner::Tie);
    }

    #[test]
    fn pairs_follow_input_order() {
        let entries = [
            fighter("a1", 100),
            fighter("a2", 400),
            fighter("b1", 200),
            fighter("b2", 300),
        ];
        let result = resolve(&[&entries[0], &entries[1]], &[&entries[2], &entries[3]]).unwrap();

        let winners: Vec<_> = result.pairs.iter().map(|pair| pair.winner).collect();
        assert_eq!(winners, vec![Winner::Side(Side::B), Winner::Side(Side::A)]);
        assert_eq!(result.pairs[1].index, 1);
        assert_eq!(result.pairs[1].name_b, "b2");
    }

    #[test]
    fn resolve_is_deterministic() {
        let (a, b) = (fighter("onix", 385), fighter("geodude", 300));
        assert_eq!(resolve(&[&a], &[&b]), resolve(&[&a], &[&b]));
    }

    #[test]
    fn unequal_lengths_are_rejected() {
        let (a, b) = (fighter("onix", 385), fighter("geodude", 300));
        assert_eq!(
            resolve(&[&a, &a], &[&b]),
            Err(BattleError::InvalidRosterPairing {
                side_a: 2,
                side_b: 1
            })
        );
    }

    #[test]
    fn empty_side_is_rejected() {
        let b = fighter("geodude", 300);
        assert_eq!(
            resolve(&[], &[&b]),
            Err(BattleError::InvalidRosterPairing {
                side_a: 0,
                side_b: 1
            })
        );
    }

    #[test]
    fn summary_names_each_pair_and_winner() {
        let (a, b) = (fighter("mr-mime", 460), fighter("jynx", 455));
        let result = resolve(&[&a], &[&b]).unwrap();

        assert_eq!(
            result.summary_lines(),
            vec![
                "Mr Mime beat Jynx!".to_string(),
                String::new(),
                "Side A wins!".to_string(),
            ]
        );
    }
}
