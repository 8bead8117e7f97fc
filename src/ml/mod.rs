//! Supervised number scoring: per-number features, sliding-window labels,
//! class rebalancing and the two-learner ensemble.

pub mod features;
pub mod labeling;
pub mod models;
pub mod sampling;

pub use models::{MlEnsemble, ProbabilityModel, TrainedModels};
