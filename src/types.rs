use crate::error::{OracleError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest number that can be drawn.
pub const MAX_NUMBER: u8 = 90;
/// Numbers per panel and per prediction.
pub const PICK_SIZE: usize = 5;
/// Numbers strictly above this value count as "high".
pub const HIGH_THRESHOLD: u8 = 45;

/// One historical draw as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    #[serde(alias = "winningNumbers", alias = "winning_numbers")]
    pub winning: Vec<u8>,
    #[serde(default, alias = "machineNumbers", alias = "machine_numbers")]
    pub machine: Option<Vec<u8>>,
    #[serde(default, alias = "drawDate", alias = "draw_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "drawType")]
    pub draw_type: Option<String>,
}

impl Draw {
    pub fn new(winning: Vec<u8>) -> Self {
        Self {
            winning,
            machine: None,
            date: None,
            draw_type: None,
        }
    }

    pub fn with_machine(mut self, machine: Vec<u8>) -> Self {
        self.machine = Some(machine);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Set of numbers in 1..=90 packed into a bitmask.
///
/// Panels are compared by membership only, so within-panel duplicates
/// collapse into a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumberSet(u128);

impl NumberSet {
    pub fn from_slice(numbers: &[u8]) -> Self {
        let mut set = Self::default();
        for &n in numbers {
            set.insert(n);
        }
        set
    }

    pub fn insert(&mut self, n: u8) {
        if (1..=MAX_NUMBER).contains(&n) {
            self.0 |= 1u128 << n;
        }
    }

    pub fn remove(&mut self, n: u8) {
        if (1..=MAX_NUMBER).contains(&n) {
            self.0 &= !(1u128 << n);
        }
    }

    pub fn contains(&self, n: u8) -> bool {
        (1..=MAX_NUMBER).contains(&n) && self.0 & (1u128 << n) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn overlap(&self, other: &NumberSet) -> usize {
        (self.0 & other.0).count_ones() as usize
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=MAX_NUMBER).filter(move |&n| self.contains(n))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

/// A five-number candidate set. Only constructible through [`PredictionSet::new`],
/// so the derived fields always agree with the numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionSet {
    numbers: [u8; PICK_SIZE],
    sum: u32,
    even_count: u8,
    high_count: u8,
}

impl PredictionSet {
    pub fn new(numbers: &[u8]) -> Result<Self> {
        if numbers.len() != PICK_SIZE {
            return Err(OracleError::InvalidInput(format!(
                "prediction must contain exactly {} numbers, got {}",
                PICK_SIZE,
                numbers.len()
            )));
        }
        let mut sorted = [0u8; PICK_SIZE];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();

        if let Some(bad) = sorted.iter().find(|&&n| n == 0 || n > MAX_NUMBER) {
            return Err(OracleError::InvalidInput(format!(
                "prediction number {} outside 1..={}",
                bad, MAX_NUMBER
            )));
        }
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(OracleError::InvalidInput(format!(
                "prediction {:?} contains duplicates",
                sorted
            )));
        }

        Ok(Self {
            numbers: sorted,
            sum: sorted.iter().map(|&n| n as u32).sum(),
            even_count: sorted.iter().filter(|&&n| n % 2 == 0).count() as u8,
            high_count: sorted.iter().filter(|&&n| n > HIGH_THRESHOLD).count() as u8,
        })
    }

    pub fn numbers(&self) -> &[u8; PICK_SIZE] {
        &self.numbers
    }

    pub fn sum(&self) -> u32 {
        self.sum
    }

    pub fn even_count(&self) -> u8 {
        self.even_count
    }

    pub fn high_count(&self) -> u8 {
        self.high_count
    }

    pub fn as_set(&self) -> NumberSet {
        NumberSet::from_slice(&self.numbers)
    }

    pub fn contains(&self, n: u8) -> bool {
        self.numbers.binary_search(&n).is_ok()
    }
}

impl fmt::Display for PredictionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.numbers.iter().map(|n| n.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// One of the four independent prediction algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Ml,
    Genetic,
    Pattern,
    Intelligence,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Ml,
        StrategyKind::Genetic,
        StrategyKind::Pattern,
        StrategyKind::Intelligence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Ml => "ml",
            StrategyKind::Genetic => "genetic",
            StrategyKind::Pattern => "pattern",
            StrategyKind::Intelligence => "intelligence",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy name accepted in a prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    Ml,
    Genetic,
    Pattern,
    Intelligence,
    Ensemble,
}

impl StrategyName {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyName::Ml => "ml",
            StrategyName::Genetic => "genetic",
            StrategyName::Pattern => "pattern",
            StrategyName::Intelligence => "intelligence",
            StrategyName::Ensemble => "ensemble",
        }
    }

    /// Strategies that have to run to answer this request.
    pub fn strategies(&self) -> Vec<StrategyKind> {
        match self {
            StrategyName::Ml => vec![StrategyKind::Ml],
            StrategyName::Genetic => vec![StrategyKind::Genetic],
            StrategyName::Pattern => vec![StrategyKind::Pattern],
            StrategyName::Intelligence => vec![StrategyKind::Intelligence],
            StrategyName::Ensemble => StrategyKind::ALL.to_vec(),
        }
    }

    pub fn is_ensemble(&self) -> bool {
        matches!(self, StrategyName::Ensemble)
    }
}

impl std::str::FromStr for StrategyName {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ml" => Ok(StrategyName::Ml),
            "genetic" => Ok(StrategyName::Genetic),
            "pattern" => Ok(StrategyName::Pattern),
            "intelligence" => Ok(StrategyName::Intelligence),
            "ensemble" => Ok(StrategyName::Ensemble),
            other => Err(OracleError::InvalidInput(format!(
                "unknown strategy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behavioural classification of a number within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberState {
    Dormant,
    Warming,
    Active,
    Overheated,
    Breakout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_set_derived_fields() {
        let set = PredictionSet::new(&[50, 3, 12, 88, 47]).unwrap();
        assert_eq!(set.numbers(), &[3, 12, 47, 50, 88]);
        assert_eq!(set.sum(), 200);
        assert_eq!(set.even_count(), 3);
        assert_eq!(set.high_count(), 3);
    }

    #[test]
    fn test_prediction_set_rejects_malformed() {
        assert!(PredictionSet::new(&[1, 2, 3, 4]).is_err());
        assert!(PredictionSet::new(&[1, 2, 3, 4, 4]).is_err());
        assert!(PredictionSet::new(&[0, 2, 3, 4, 5]).is_err());
        assert!(PredictionSet::new(&[1, 2, 3, 4, 91]).is_err());
    }

    #[test]
    fn test_number_set_collapses_duplicates() {
        let set = NumberSet::from_slice(&[7, 7, 12, 90, 1]);
        assert_eq!(set.len(), 4);
        assert_eq!(set.to_vec(), vec![1, 7, 12, 90]);
        assert!(!set.contains(0));
        assert!(!set.contains(91));
    }

    #[test]
    fn test_strategy_name_parsing() {
        assert_eq!("Ensemble".parse::<StrategyName>().unwrap(), StrategyName::Ensemble);
        assert!("neural".parse::<StrategyName>().is_err());
        assert_eq!(StrategyName::Ensemble.strategies().len(), 4);
    }
}
