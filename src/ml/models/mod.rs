pub mod boosting;
pub mod ensemble;
pub mod forest;
pub mod scaler;

pub use boosting::BoostedTrees;
pub use ensemble::{MlEnsemble, TrainedModels};
pub use forest::BaggedForest;
pub use scaler::StandardScaler;

use crate::error::Result;

/// Binary learner producing a positive-class probability per row.
pub trait ProbabilityModel: Send + Sync {
    fn name(&self) -> &'static str;

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;
}
