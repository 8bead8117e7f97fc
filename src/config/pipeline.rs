use super::traits::ConfigSection;
use crate::error::OracleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_predictions: usize,
    pub repair_anti_patterns: bool,
    /// Minimum draws required by `analyze`.
    pub analysis_min_draws: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_predictions: 10,
            repair_anti_patterns: false,
            analysis_min_draws: 50,
        }
    }
}

impl ConfigSection for PipelineConfig {
    fn section_name() -> &'static str {
        "pipeline"
    }

    fn validate(&self) -> Result<(), OracleError> {
        if self.max_predictions == 0 {
            return Err(OracleError::Configuration(
                "pipeline.max_predictions must be at least 1".to_string(),
            ));
        }
        if self.analysis_min_draws == 0 {
            return Err(OracleError::Configuration(
                "pipeline.analysis_min_draws must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
