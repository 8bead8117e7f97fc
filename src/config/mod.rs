pub mod traits;
pub mod ml;
pub mod evolution;
pub mod pattern;
pub mod intelligence;
pub mod ensemble;
pub mod pipeline;
pub mod timeout;
pub mod manager;

pub use manager::{ConfigManager, OracleConfig};
pub use ml::{BoostingConfig, FeatureConfig, ForestConfig, MlConfig, Oversampling};
pub use evolution::GeneticConfig;
pub use pattern::PatternConfig;
pub use intelligence::{
    IntelligenceConfig, ScoreWeights, StateMultipliers, StateThresholds, TicketBonuses,
};
pub use ensemble::{ConfidenceWeights, EnsembleConfig, RegimeConfig, StrategyWeights};
pub use pipeline::PipelineConfig;
pub use timeout::{CostFactors, TimeoutConfig};
pub use traits::ConfigSection;
