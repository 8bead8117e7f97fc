use crate::engines::ensemble::{ConfidenceReport, Consensus, RegimeReport};
use crate::engines::PatternSummary;
use crate::error::ErrorReport;
use crate::ml::features::TrendReport;
use crate::types::{Draw, PredictionSet, StrategyName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_count() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub draws: Vec<Draw>,
    pub strategy: StrategyName,
    #[serde(default = "default_count")]
    pub count: usize,
}

impl PredictionRequest {
    pub fn new(draws: Vec<Draw>, strategy: StrategyName) -> Self {
        Self {
            draws,
            strategy,
            count: default_count(),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub strategy: StrategyName,
    /// Sets per strategy name; `ensemble` holds the consensus set.
    pub predictions: BTreeMap<String, Vec<PredictionSet>>,
    pub consensus: Option<Consensus>,
    pub regime_change: Option<RegimeReport>,
    pub confidence: BTreeMap<String, ConfidenceReport>,
    /// Strategies that were skipped or failed inside an ensemble request.
    pub failures: BTreeMap<String, ErrorReport>,
    pub data_points_used: usize,
}

impl PredictionResponse {
    /// Primary set of the requested strategy.
    pub fn primary(&self) -> Option<&PredictionSet> {
        self.predictions
            .get(self.strategy.name())
            .and_then(|sets| sets.first())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub patterns: PatternSummary,
    pub trends: TrendReport,
    pub regime_change: RegimeReport,
    pub data_points_used: usize,
}
