//! Request-level orchestration: validation, seeding, concurrent strategy
//! execution under a deadline, and response assembly.

pub mod oracle;
pub mod request;

pub use oracle::Oracle;
pub use request::{AnalysisReport, PredictionRequest, PredictionResponse};
