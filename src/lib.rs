pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;
pub mod ml;
pub mod pipeline;
pub mod types;
pub mod utils;

pub use error::{ErrorKind, ErrorReport, OracleError, Result};
pub use pipeline::{AnalysisReport, Oracle, PredictionRequest, PredictionResponse};
pub use types::{Draw, NumberSet, NumberState, PredictionSet, StrategyKind, StrategyName};
