use crate::data::{DrawWindow, MachineWindow};
use crate::engines::seed::RequestSeed;
use crate::error::{OracleError, Result};
use crate::types::{PredictionSet, StrategyKind};
use crate::utils::Deadline;

/// Everything a strategy may read while answering one request.
pub struct StrategyContext<'a> {
    pub window: &'a DrawWindow,
    pub machine: &'a MachineWindow,
    pub seed: RequestSeed,
    pub deadline: &'a Deadline,
    /// Prediction sets requested; strategies return at least one.
    pub count: usize,
}

pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// `(required, actual)` draw counts for this request.
    fn data_requirement(&self, ctx: &StrategyContext) -> (usize, usize);

    fn predict(&self, ctx: &StrategyContext) -> Result<Vec<PredictionSet>>;

    fn check_minimum(&self, ctx: &StrategyContext) -> Result<()> {
        let (required, actual) = self.data_requirement(ctx);
        if actual < required {
            return Err(OracleError::insufficient(self.kind().name(), required, actual));
        }
        Ok(())
    }
}
