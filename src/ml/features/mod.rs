pub mod extractor;
pub mod trend;

pub use extractor::{
    skip_of, trend_score, FeatureExtractor, FeatureRecord, FeatureTable, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use trend::{Momentum, TrendAnalyzer, TrendDirection, TrendReport};
