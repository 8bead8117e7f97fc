use crate::error::{OracleError, Result};
use crate::types::{Draw, MAX_NUMBER, PICK_SIZE};

pub struct DrawValidator;

impl DrawValidator {
    /// Validate every winning panel: exactly five numbers in 1..=90.
    /// Duplicates inside a panel are accepted.
    pub fn validate_draws(draws: &[Draw]) -> Result<()> {
        for (i, draw) in draws.iter().enumerate() {
            if draw.winning.len() != PICK_SIZE {
                return Err(OracleError::InvalidInput(format!(
                    "draw {} has {} winning numbers, expected {}",
                    i,
                    draw.winning.len(),
                    PICK_SIZE
                )));
            }
            if let Some(bad) = draw.winning.iter().find(|&&n| n == 0 || n > MAX_NUMBER) {
                return Err(OracleError::InvalidInput(format!(
                    "draw {} has winning number {} outside 1..={}",
                    i, bad, MAX_NUMBER
                )));
            }
        }
        Ok(())
    }

    /// Machine panels only matter to the relationship model; malformed ones
    /// are skipped there instead of failing the request.
    pub fn is_well_formed_panel(panel: &[u8]) -> bool {
        panel.len() == PICK_SIZE && panel.iter().all(|&n| (1..=MAX_NUMBER).contains(&n))
    }

    pub fn count_machine_panels(draws: &[Draw]) -> usize {
        draws
            .iter()
            .filter(|d| matches!(&d.machine, Some(p) if Self::is_well_formed_panel(p)))
            .count()
    }

    /// Check for minimum required draws
    pub fn validate_minimum(context: &str, actual: usize, required: usize) -> Result<()> {
        if actual < required {
            return Err(OracleError::insufficient(context, required, actual));
        }
        Ok(())
    }

    pub fn validate_count(count: usize, max: usize) -> Result<()> {
        if count == 0 || count > max {
            return Err(OracleError::InvalidInput(format!(
                "prediction count must be between 1 and {}, got {}",
                max, count
            )));
        }
        Ok(())
    }

    /// Chronological order: a stable sort by date when every draw carries
    /// one, otherwise the order given by the caller.
    pub fn chronological(draws: &[Draw]) -> Vec<Draw> {
        let mut ordered = draws.to_vec();
        if !ordered.is_empty() && ordered.iter().all(|d| d.date.is_some()) {
            ordered.sort_by_key(|d| d.date);
        }
        ordered
    }
}
