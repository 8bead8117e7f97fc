pub mod analysis;
pub mod ensemble;
pub mod evaluation;
pub mod generation;
pub mod intelligence;
pub mod pattern;
pub mod seed;
pub mod strategy;

pub use analysis::PatternSummary;
pub use seed::RequestSeed;
pub use strategy::{Strategy, StrategyContext};
