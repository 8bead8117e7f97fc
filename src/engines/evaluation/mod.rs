//! Post-hoc checks on prediction sets: structural anti-patterns, zone, gap
//! and position plausibility, and scoring against an actual draw.

pub mod anti_pattern;
pub mod gaps;
pub mod positions;
pub mod zones;

pub use anti_pattern::{AntiPattern, AntiPatternCheck, AntiPatternFilter};
pub use gaps::{GapAnalyzer, GapReport};
pub use positions::{PositionAnalyzer, PositionReport};
pub use zones::{ZoneAnalyzer, ZoneReport};

use crate::types::{NumberSet, PredictionSet, MAX_NUMBER, PICK_SIZE};
use serde::Serialize;

/// Two-sided 5% critical value.
const Z_CRITICAL: f64 = 1.96;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub matches: usize,
    pub matched_numbers: Vec<u8>,
    pub expected_random: f64,
    pub z_score: f64,
    pub significant: bool,
}

/// Matches between a prediction and an actual panel, against the
/// hypergeometric expectation for a random five-number pick.
pub fn evaluate(prediction: &PredictionSet, actual: &[u8]) -> Evaluation {
    let actual = NumberSet::from_slice(actual);
    let matched_numbers: Vec<u8> = prediction
        .numbers()
        .iter()
        .copied()
        .filter(|&n| actual.contains(n))
        .collect();
    let matches = matched_numbers.len();

    let p = PICK_SIZE as f64 / MAX_NUMBER as f64;
    let expected_random = PICK_SIZE as f64 * p;
    let std = (expected_random * (1.0 - p)).sqrt();
    let z_score = (matches as f64 - expected_random) / std;

    Evaluation {
        matches,
        matched_numbers,
        expected_random,
        z_score,
        significant: z_score.abs() > Z_CRITICAL,
    }
}
