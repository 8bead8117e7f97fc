use super::{BaggedForest, BoostedTrees, ProbabilityModel, StandardScaler};
use crate::config::MlConfig;
use crate::data::{DrawWindow, ModelCache};
use crate::engines::strategy::{Strategy, StrategyContext};
use crate::error::{OracleError, Result};
use crate::ml::features::{skip_of, FeatureExtractor};
use crate::ml::labeling::SlidingWindowLabeler;
use crate::ml::sampling::Oversampler;
use crate::types::{NumberSet, PredictionSet, StrategyKind, MAX_NUMBER, PICK_SIZE};
use crate::utils::Deadline;
use rand::Rng;
use std::sync::Arc;

/// Fitted scaler and learners for one window and seed.
pub struct TrainedModels {
    scaler: StandardScaler,
    learners: Vec<Box<dyn ProbabilityModel>>,
}

impl TrainedModels {
    /// Averaged learner probabilities for the feature rows of `window`,
    /// normalised to sum to 1. Index 0 is number 1.
    pub fn number_probabilities(&self, history: &[NumberSet], extractor: &FeatureExtractor) -> Result<Vec<f64>> {
        let table = extractor.extract(history);
        let x = self.scaler.transform(&table.matrix());

        let mut averaged = vec![0.0; x.len()];
        for learner in &self.learners {
            let p = learner.predict_proba(&x)?;
            if p.len() != averaged.len() {
                return Err(OracleError::Model(format!(
                    "{} returned {} probabilities for {} rows",
                    learner.name(),
                    p.len(),
                    averaged.len()
                )));
            }
            for (acc, v) in averaged.iter_mut().zip(p) {
                *acc += v / self.learners.len() as f64;
            }
        }

        let total: f64 = averaged.iter().sum();
        if !(total > 0.0) || !total.is_finite() {
            log::warn!("ML probabilities degenerate (sum {}), using uniform", total);
            return Ok(vec![1.0 / averaged.len() as f64; averaged.len()]);
        }
        Ok(averaged.into_iter().map(|p| p / total).collect())
    }
}

/// Supervised strategy: a bagging forest and a boosted ensemble trained on
/// sliding-window labels, combined by probability averaging.
pub struct MlEnsemble {
    config: MlConfig,
    oversampler: Oversampler,
    labeler: SlidingWindowLabeler,
    extractor: FeatureExtractor,
    cache: Option<Arc<ModelCache<TrainedModels>>>,
}

impl MlEnsemble {
    pub fn new(config: MlConfig) -> Self {
        let oversampler = Oversampler::new(config.oversampling, config.smote_neighbors);
        let labeler = SlidingWindowLabeler::new(config.features.clone(), config.max_training_steps);
        let extractor = FeatureExtractor::new(config.features.clone());
        Self {
            config,
            oversampler,
            labeler,
            extractor,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ModelCache<TrainedModels>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Train (or fetch) the models for this window and return per-number
    /// probabilities.
    pub fn probabilities(&self, ctx: &StrategyContext) -> Result<Vec<f64>> {
        let key = format!("{:016x}:{:08x}", ctx.window.fingerprint(), ctx.seed.value());
        let models = match self.cache.as_ref().and_then(|c| c.get(&key)) {
            Some(hit) => {
                log::debug!("ML model cache hit for {}", key);
                hit
            }
            None => {
                let mut rng = ctx.seed.rng_for(StrategyKind::Ml.name());
                let trained = Arc::new(self.train(ctx.window, &mut rng, ctx.deadline)?);
                if let Some(cache) = &self.cache {
                    cache.set(key, Arc::clone(&trained));
                }
                trained
            }
        };
        ctx.deadline.check()?;
        models.number_probabilities(ctx.window.winning(), &self.extractor)
    }

    fn train<R: Rng>(&self, window: &DrawWindow, rng: &mut R, deadline: &Deadline) -> Result<TrainedModels> {
        let dataset = self.labeler.build(window.winning(), deadline)?;
        if dataset.is_empty() {
            return Err(OracleError::InternalFailure(
                "no training steps available".to_string(),
            ));
        }

        deadline.check()?;
        let balanced = self.oversampler.balance(&dataset, rng);
        let scaler = StandardScaler::fit(&balanced.rows);
        let x = scaler.transform(&balanced.rows);

        let forest = BaggedForest::fit(&x, &balanced.labels, &self.config.forest, rng.gen())?;
        deadline.check()?;
        let boosted = BoostedTrees::fit(&x, &balanced.labels, &self.config.boosting, deadline)?;

        log::debug!(
            "ML trained on {} rows ({:?}), {} boosting rounds",
            balanced.len(),
            self.oversampler.method(),
            boosted.rounds()
        );

        Ok(TrainedModels {
            scaler,
            learners: vec![Box::new(forest), Box::new(boosted)],
        })
    }

    /// Anchors plus diversity picks, alternates continuing down the
    /// tie-break ranking.
    pub fn select(&self, probs: &[f64], window: &DrawWindow, count: usize) -> Result<Vec<PredictionSet>> {
        let anchors_n = self.config.anchor_count.min(PICK_SIZE);
        let fill = PICK_SIZE - anchors_n;

        let mut ranked: Vec<u8> = (1..=MAX_NUMBER).collect();
        ranked.sort_by(|&a, &b| {
            prob(probs, b)
                .total_cmp(&prob(probs, a))
                .then(a.cmp(&b))
        });

        let anchors = &ranked[..anchors_n];
        let tier_end = self.config.diversity_rank_end.clamp(PICK_SIZE, ranked.len());
        let mut tier: Vec<u8> = ranked[anchors_n..tier_end].to_vec();

        let draws = window.winning();
        let cooccurrence = |n: u8| -> usize {
            draws
                .iter()
                .filter(|d| d.contains(n))
                .map(|d| anchors.iter().filter(|&&a| d.contains(a)).count())
                .sum()
        };
        tier.sort_by(|&a, &b| {
            cooccurrence(b)
                .cmp(&cooccurrence(a))
                .then(skip_of(draws, a).cmp(&skip_of(draws, b)))
                .then(prob(probs, b).total_cmp(&prob(probs, a)))
                .then(a.cmp(&b))
        });

        let mut extended = tier;
        extended.extend_from_slice(&ranked[tier_end..]);

        let mut sets = Vec::with_capacity(count.max(1));
        for i in 0..count.max(1) {
            let start = i * fill;
            if start + fill > extended.len() {
                break;
            }
            let mut numbers = anchors.to_vec();
            numbers.extend_from_slice(&extended[start..start + fill]);
            sets.push(PredictionSet::new(&numbers)?);
            if fill == 0 {
                break;
            }
        }
        Ok(sets)
    }
}

fn prob(probs: &[f64], n: u8) -> f64 {
    probs.get(n as usize - 1).copied().unwrap_or(0.0)
}

impl Strategy for MlEnsemble {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Ml
    }

    fn data_requirement(&self, ctx: &StrategyContext) -> (usize, usize) {
        (self.config.min_draws, ctx.window.len())
    }

    fn predict(&self, ctx: &StrategyContext) -> Result<Vec<PredictionSet>> {
        self.check_minimum(ctx)?;
        let probs = self.probabilities(ctx)?;
        let sets = self.select(&probs, ctx.window, ctx.count)?;
        if let Some(primary) = sets.first() {
            log::debug!("ML primary set {}", primary);
        }
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_uses_anchors_and_cooccurrence() {
        let ml = MlEnsemble::new(MlConfig::default());
        let mut probs = vec![0.001; 90];
        // anchors 10, 20, 30
        probs[9] = 0.2;
        probs[19] = 0.19;
        probs[29] = 0.18;
        // rank 4..: 40 > 41 > 42 by probability
        probs[39] = 0.1;
        probs[40] = 0.09;
        probs[41] = 0.08;

        // 42 co-occurs with anchors, 41 is most recent
        let window = DrawWindow::from_sets(vec![
            NumberSet::from_slice(&[10, 20, 42, 60, 70]),
            NumberSet::from_slice(&[30, 42, 61, 71, 81]),
            NumberSet::from_slice(&[41, 62, 72, 82, 88]),
        ]);

        let sets = ml.select(&probs, &window, 2).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].numbers(), &[10, 20, 30, 41, 42]);
        // both alternates keep the anchors
        assert!(sets[1].contains(10) && sets[1].contains(20) && sets[1].contains(30));
        assert!(sets[1].contains(40));
        assert_ne!(sets[0], sets[1]);
    }
}
