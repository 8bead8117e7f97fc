use crate::error::Result;
use crate::types::{NumberSet, PredictionSet, HIGH_THRESHOLD, MAX_NUMBER, PICK_SIZE};
use serde::Serialize;

const SUM_FLOOR: u32 = 100;
const SUM_CEILING: u32 = 350;
const PENALTY_PER_VIOLATION: f64 = 0.15;
const MAX_REPAIR_ITERATIONS: usize = 10;

/// Shapes that rarely occur in real draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiPattern {
    AllEvens,
    AllOdds,
    AllHigh,
    AllLow,
    SingleDecade,
    FiveConsecutive,
    SumTooLow,
    SumTooHigh,
    AllMultiplesOf5,
    AllMultiplesOf10,
}

impl AntiPattern {
    pub const ALL: [AntiPattern; 10] = [
        AntiPattern::AllEvens,
        AntiPattern::AllOdds,
        AntiPattern::AllHigh,
        AntiPattern::AllLow,
        AntiPattern::SingleDecade,
        AntiPattern::FiveConsecutive,
        AntiPattern::SumTooLow,
        AntiPattern::SumTooHigh,
        AntiPattern::AllMultiplesOf5,
        AntiPattern::AllMultiplesOf10,
    ];

    pub fn matches(&self, numbers: &[u8]) -> bool {
        let all = |f: &dyn Fn(u8) -> bool| numbers.iter().all(|&n| f(n));
        match self {
            AntiPattern::AllEvens => all(&|n| n % 2 == 0),
            AntiPattern::AllOdds => all(&|n| n % 2 == 1),
            AntiPattern::AllHigh => all(&|n| n > HIGH_THRESHOLD),
            AntiPattern::AllLow => all(&|n| n <= HIGH_THRESHOLD),
            AntiPattern::SingleDecade => {
                let first = decade(numbers[0]);
                all(&|n| decade(n) == first)
            }
            AntiPattern::FiveConsecutive => {
                let mut sorted = numbers.to_vec();
                sorted.sort_unstable();
                sorted.windows(2).all(|w| w[1] == w[0] + 1)
            }
            AntiPattern::SumTooLow => sum(numbers) < SUM_FLOOR,
            AntiPattern::SumTooHigh => sum(numbers) > SUM_CEILING,
            AntiPattern::AllMultiplesOf5 => all(&|n| n % 5 == 0),
            AntiPattern::AllMultiplesOf10 => all(&|n| n % 10 == 0),
        }
    }
}

fn decade(n: u8) -> u8 {
    (n - 1) / 10
}

fn sum(numbers: &[u8]) -> u32 {
    numbers.iter().map(|&n| n as u32).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AntiPatternCheck {
    pub is_valid: bool,
    pub violations: Vec<AntiPattern>,
    pub score: f64,
}

pub struct AntiPatternFilter;

impl AntiPatternFilter {
    pub fn check(set: &PredictionSet) -> AntiPatternCheck {
        Self::check_numbers(set.numbers())
    }

    fn check_numbers(numbers: &[u8]) -> AntiPatternCheck {
        let violations: Vec<AntiPattern> = AntiPattern::ALL
            .iter()
            .copied()
            .filter(|p| p.matches(numbers))
            .collect();
        AntiPatternCheck {
            is_valid: violations.is_empty(),
            score: 1.0 - PENALTY_PER_VIOLATION * violations.len() as f64,
            violations,
        }
    }

    /// Replace members until no anti-pattern remains or the iteration cap is
    /// hit. Replacements come from `pool` first, then 1..=90 ascending.
    pub fn repair(set: &PredictionSet, pool: &[u8]) -> Result<PredictionSet> {
        let mut numbers = set.numbers().to_vec();
        let order: Vec<u8> = pool
            .iter()
            .copied()
            .filter(|n| (1..=MAX_NUMBER).contains(n))
            .chain(1..=MAX_NUMBER)
            .collect();

        for _ in 0..MAX_REPAIR_ITERATIONS {
            let check = Self::check_numbers(&numbers);
            let Some(&violation) = check.violations.first() else {
                break;
            };
            let taken = NumberSet::from_slice(&numbers);
            numbers.sort_unstable();

            let (slot, wanted): (usize, Box<dyn Fn(u8) -> bool>) = match violation {
                AntiPattern::AllEvens => (0, Box::new(|n| n % 2 == 1)),
                AntiPattern::AllOdds => (0, Box::new(|n| n % 2 == 0)),
                AntiPattern::AllHigh => (0, Box::new(|n| n <= HIGH_THRESHOLD)),
                AntiPattern::AllLow => (PICK_SIZE - 1, Box::new(|n| n > HIGH_THRESHOLD)),
                AntiPattern::SingleDecade => {
                    let d = decade(numbers[0]);
                    (PICK_SIZE - 1, Box::new(move |n| decade(n) != d))
                }
                AntiPattern::FiveConsecutive => {
                    let (lo, hi) = (numbers[0], numbers[PICK_SIZE - 1]);
                    (PICK_SIZE / 2, Box::new(move |n| n + 1 < lo || n > hi + 1))
                }
                AntiPattern::SumTooLow => (0, Box::new(|n| n > 60)),
                AntiPattern::SumTooHigh => (PICK_SIZE - 1, Box::new(|n| n < 30)),
                AntiPattern::AllMultiplesOf5 | AntiPattern::AllMultiplesOf10 => {
                    (0, Box::new(|n| n % 5 != 0))
                }
            };

            match order.iter().copied().find(|&n| !taken.contains(n) && wanted(n)) {
                Some(replacement) => numbers[slot] = replacement,
                None => break,
            }
        }
        PredictionSet::new(&numbers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(n: &[u8]) -> PredictionSet {
        PredictionSet::new(n).unwrap()
    }

    #[test]
    fn test_detects_violations() {
        let check = AntiPatternFilter::check(&set(&[2, 4, 6, 8, 10]));
        assert!(!check.is_valid);
        assert!(check.violations.contains(&AntiPattern::AllEvens));
        assert!(check.violations.contains(&AntiPattern::AllLow));
        assert!(check.violations.contains(&AntiPattern::SumTooLow));
        assert!(!check.violations.contains(&AntiPattern::AllMultiplesOf5));

        let ok = AntiPatternFilter::check(&set(&[7, 22, 39, 56, 81]));
        assert!(ok.is_valid);
        assert_eq!(ok.score, 1.0);

        let tens = AntiPatternFilter::check(&set(&[10, 20, 30, 40, 50]));
        assert!(tens.violations.contains(&AntiPattern::AllMultiplesOf10));
        assert!(tens.violations.contains(&AntiPattern::AllMultiplesOf5));
        assert!((tens.score - (1.0 - 0.15 * tens.violations.len() as f64)).abs() < 1e-12);
    }

    #[test]
    fn test_five_consecutive() {
        assert!(AntiPattern::FiveConsecutive.matches(&[41, 42, 43, 44, 45]));
        assert!(!AntiPattern::FiveConsecutive.matches(&[41, 42, 43, 44, 46]));
    }

    #[test]
    fn test_repair_removes_violations() {
        for bad in [
            [2, 4, 6, 8, 10],
            [1, 2, 3, 4, 5],
            [81, 83, 85, 87, 89],
            [10, 20, 30, 40, 50],
            [61, 62, 63, 64, 65],
        ] {
            let fixed = AntiPatternFilter::repair(&set(&bad), &[]).unwrap();
            let check = AntiPatternFilter::check(&fixed);
            assert!(check.is_valid, "{:?} -> {} {:?}", bad, fixed, check.violations);
        }
    }

    #[test]
    fn test_repair_keeps_clean_sets_and_prefers_pool() {
        let clean = set(&[7, 22, 39, 56, 81]);
        assert_eq!(AntiPatternFilter::repair(&clean, &[1]).unwrap(), clean);

        let fixed = AntiPatternFilter::repair(&set(&[12, 24, 36, 48, 60]), &[77]).unwrap();
        assert!(fixed.contains(77));
    }
}
