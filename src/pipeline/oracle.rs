use super::request::{AnalysisReport, PredictionRequest, PredictionResponse};
use crate::config::OracleConfig;
use crate::data::{DrawValidator, DrawWindow, MachineWindow, ModelCache};
use crate::engines::ensemble::{ConfidenceReport, EnsembleCombiner};
use crate::engines::evaluation::AntiPatternFilter;
use crate::engines::generation::GeneticOptimizer;
use crate::engines::intelligence::IntelligenceEngine;
use crate::engines::pattern::PatternMatcher;
use crate::engines::{PatternSummary, RequestSeed, Strategy, StrategyContext};
use crate::error::{OracleError, Result};
use crate::functions::ranking::frequency_ranked;
use crate::ml::features::TrendAnalyzer;
use crate::ml::{MlEnsemble, TrainedModels};
use crate::types::{Draw, NumberSet, PredictionSet, StrategyKind, PICK_SIZE};
use crate::utils::Deadline;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Numbers per trend list feeding the anti-pattern repair pool.
const TREND_POOL: usize = 10;

/// Prediction engine. Holds configuration and the optional trained-model
/// cache; every request is otherwise independent.
pub struct Oracle {
    config: OracleConfig,
    model_cache: Arc<ModelCache<TrainedModels>>,
}

/// Shared read-only inputs of one request.
struct RequestScope<'a> {
    window: &'a DrawWindow,
    machine: &'a MachineWindow,
    seed: RequestSeed,
    deadline: &'a Deadline,
    count: usize,
}

impl Oracle {
    pub fn new(config: OracleConfig) -> Result<Self> {
        config.validate()?;
        let model_cache = Arc::new(ModelCache::new(config.ml.cache_capacity));
        Ok(Self {
            config,
            model_cache,
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn strategy(&self, kind: StrategyKind) -> Box<dyn Strategy> {
        match kind {
            StrategyKind::Ml => Box::new(
                MlEnsemble::new(self.config.ml.clone()).with_cache(Arc::clone(&self.model_cache)),
            ),
            StrategyKind::Genetic => Box::new(GeneticOptimizer::new(self.config.genetic.clone())),
            StrategyKind::Pattern => Box::new(PatternMatcher::new(self.config.pattern.clone())),
            StrategyKind::Intelligence => {
                Box::new(IntelligenceEngine::new(self.config.intelligence.clone()))
            }
        }
    }

    /// Answer one prediction request.
    ///
    /// The response depends only on the draws and the configuration. Dated
    /// draws are reordered by date, so any permutation of a fully dated
    /// history gives the same output. Undated draws keep the caller's order
    /// (after the dated ones), and reordering them changes the result.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        DrawValidator::validate_draws(&request.draws)?;
        DrawValidator::validate_count(request.count, self.config.pipeline.max_predictions)?;

        let ordered = DrawValidator::chronological(&request.draws);
        let window = DrawWindow::new(&ordered);
        let machine = window.machine_qualified();
        let seed = RequestSeed::derive(&ordered, request.strategy.name());

        log::info!(
            "predict strategy={} draws={} machine_draws={} count={}",
            request.strategy,
            window.len(),
            machine.len(),
            request.count
        );

        // Minimums are checked up front so a short window never starts work.
        let unbounded = Deadline::unbounded();
        let probe = RequestScope {
            window: &window,
            machine: &machine,
            seed,
            deadline: &unbounded,
            count: request.count,
        };
        let mut failures = BTreeMap::new();
        let mut runnable = Vec::new();
        let mut shortfall: Option<OracleError> = None;
        for kind in request.strategy.strategies() {
            let strategy = self.strategy(kind);
            match strategy.check_minimum(&probe.context()) {
                Ok(()) => runnable.push(kind),
                Err(e) => {
                    if !request.strategy.is_ensemble() {
                        return Err(e);
                    }
                    log::warn!("skipping {}: {}", kind, e);
                    failures.insert(kind.name().to_string(), e.report());
                    shortfall.get_or_insert(e);
                }
            }
        }
        if runnable.is_empty() {
            return Err(shortfall.unwrap_or_else(|| OracleError::insufficient("ensemble", 1, 0)));
        }

        let deadline = Deadline::new(self.config.timeout.budget(window.len(), &runnable));
        let scope = RequestScope {
            deadline: &deadline,
            ..probe
        };

        let results: Vec<(StrategyKind, Result<Vec<PredictionSet>>)> = runnable
            .par_iter()
            .map(|&kind| (kind, run_strategy(self.strategy(kind).as_ref(), &scope)))
            .collect();

        if deadline.expired() {
            log::warn!(
                "request deadline passed after {} ms, discarding results",
                deadline.elapsed().as_millis()
            );
            return Err(deadline.timeout_error());
        }

        let pool = if self.config.pipeline.repair_anti_patterns {
            repair_pool(&window)
        } else {
            Vec::new()
        };

        let mut predictions = BTreeMap::new();
        let mut primaries = BTreeMap::new();
        for (kind, result) in results {
            match result {
                Ok(sets) => {
                    let sets = self.finish_sets(sets, &pool, request.count)?;
                    if let Some(primary) = sets.first() {
                        primaries.insert(kind, primary.clone());
                    }
                    predictions.insert(kind.name().to_string(), sets);
                }
                Err(e) if matches!(e, OracleError::Timeout { .. }) => return Err(e),
                Err(e) => {
                    if !request.strategy.is_ensemble() {
                        return Err(e);
                    }
                    log::warn!("{} failed: {}", kind, e);
                    failures.insert(kind.name().to_string(), e.report());
                }
            }
        }

        let combiner = EnsembleCombiner::new(self.config.ensemble.clone());
        let consensus = if request.strategy.is_ensemble() {
            if primaries.is_empty() {
                return Err(OracleError::InternalFailure(format!(
                    "every strategy failed ({} failures)",
                    failures.len()
                )));
            }
            let consensus = combiner.combine(&primaries, &window)?;
            predictions.insert(
                request.strategy.name().to_string(),
                vec![consensus.set.clone()],
            );
            Some(consensus)
        } else {
            None
        };

        // Strategies that ended without a set are reported, not dropped.
        let mut confidence: BTreeMap<String, ConfidenceReport> = combiner
            .confidence(&primaries, &window)
            .into_iter()
            .map(|(kind, report)| (kind.name().to_string(), report))
            .collect();
        for name in failures.keys() {
            confidence
                .entry(name.clone())
                .or_insert_with(ConfidenceReport::invalid);
        }

        log::info!(
            "predict finished in {} ms with {} strategies ({} failed)",
            deadline.elapsed().as_millis(),
            primaries.len(),
            failures.len()
        );

        Ok(PredictionResponse {
            strategy: request.strategy,
            predictions,
            consensus,
            regime_change: Some(combiner.regime(&window)),
            confidence,
            failures,
            data_points_used: window.len(),
        })
    }

    /// Optional anti-pattern repair, then dedup and truncation to `count`.
    fn finish_sets(&self, sets: Vec<PredictionSet>, pool: &[u8], count: usize) -> Result<Vec<PredictionSet>> {
        let mut out: Vec<PredictionSet> = Vec::with_capacity(count);
        for set in sets {
            let set = if self.config.pipeline.repair_anti_patterns
                && !AntiPatternFilter::check(&set).is_valid
            {
                let repaired = AntiPatternFilter::repair(&set, pool)?;
                log::debug!("repaired {} into {}", set, repaired);
                repaired
            } else {
                set
            };
            if !out.contains(&set) {
                out.push(set);
            }
            if out.len() == count {
                break;
            }
        }
        Ok(out)
    }

    pub fn analyze(&self, draws: &[Draw]) -> Result<AnalysisReport> {
        DrawValidator::validate_draws(draws)?;
        DrawValidator::validate_minimum(
            "analyze",
            draws.len(),
            self.config.pipeline.analysis_min_draws,
        )?;

        let ordered = DrawValidator::chronological(draws);
        let window = DrawWindow::new(&ordered);
        let combiner = EnsembleCombiner::new(self.config.ensemble.clone());
        log::info!("analyze draws={}", window.len());

        Ok(AnalysisReport {
            patterns: PatternSummary::from_window(window.winning()),
            trends: TrendAnalyzer::trending(window.winning(), TREND_POOL),
            regime_change: combiner.regime(&window),
            data_points_used: window.len(),
        })
    }
}

impl<'a> RequestScope<'a> {
    fn context(&self) -> StrategyContext<'a> {
        StrategyContext {
            window: self.window,
            machine: self.machine,
            seed: self.seed,
            deadline: self.deadline,
            count: self.count,
        }
    }
}

/// Run one strategy at its boundary. Panics and recoverable errors after the
/// minimum check fall through to the shared frequency tier instead of
/// reaching siblings; timeouts and data shortfalls are returned as they are.
fn run_strategy(strategy: &dyn Strategy, scope: &RequestScope) -> Result<Vec<PredictionSet>> {
    let kind = strategy.kind();
    let ctx = scope.context();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.predict(&ctx)));

    let error = match outcome {
        Ok(Ok(sets)) if !sets.is_empty() => return Ok(sets),
        Ok(Ok(_)) => OracleError::InternalFailure(format!("{} returned no sets", kind)),
        Ok(Err(e)) => e,
        Err(_) => OracleError::InternalFailure(format!("{} panicked", kind)),
    };

    if matches!(
        error,
        OracleError::Timeout { .. } | OracleError::InsufficientData { .. }
    ) {
        return Err(error);
    }

    log::warn!("{} failed ({}), using frequency fallback", kind, error);
    let ranked = frequency_ranked(&scope.window.frequencies(), &NumberSet::default());
    Ok(vec![PredictionSet::new(&ranked[..PICK_SIZE])?])
}

/// Rising then accelerating numbers, deduplicated.
fn repair_pool(window: &DrawWindow) -> Vec<u8> {
    let trends = TrendAnalyzer::trending(window.winning(), TREND_POOL);
    let mut pool = trends.rising;
    for n in trends.accelerating {
        if !pool.contains(&n) {
            pool.push(n);
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrategyName;

    fn draws(n: usize) -> Vec<Draw> {
        (0..n)
            .map(|i| {
                let b = (i * 7 % 80) as u8;
                Draw::new(vec![b + 1, b + 3, b + 5, b + 8, b + 10])
            })
            .collect()
    }

    #[test]
    fn test_single_strategy_below_minimum_fails() {
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        let request = PredictionRequest::new(draws(20), StrategyName::Pattern);
        let err = oracle.predict(&request).unwrap_err();
        assert!(matches!(
            err,
            OracleError::InsufficientData { required: 60, actual: 20, .. }
        ));
    }

    #[test]
    fn test_count_is_validated() {
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        let request = PredictionRequest::new(draws(60), StrategyName::Pattern).with_count(0);
        assert!(matches!(
            oracle.predict(&request),
            Err(OracleError::InvalidInput(_))
        ));
    }

    enum Failure {
        Panic,
        Model,
        Shortfall,
    }

    struct Broken(Failure);

    impl Strategy for Broken {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Ml
        }

        fn data_requirement(&self, ctx: &StrategyContext) -> (usize, usize) {
            (1, ctx.window.len())
        }

        fn predict(&self, _ctx: &StrategyContext) -> Result<Vec<PredictionSet>> {
            match self.0 {
                Failure::Panic => panic!("learner exploded"),
                Failure::Model => Err(OracleError::Model("singular matrix".to_string())),
                Failure::Shortfall => Err(OracleError::insufficient("ml", 60, 3)),
            }
        }
    }

    fn run_broken(failure: Failure, history: &[Draw]) -> Result<Vec<PredictionSet>> {
        let window = DrawWindow::new(history);
        let machine = window.machine_qualified();
        let deadline = Deadline::unbounded();
        let scope = RequestScope {
            window: &window,
            machine: &machine,
            seed: RequestSeed::derive(history, "ml"),
            deadline: &deadline,
            count: 1,
        };
        run_strategy(&Broken(failure), &scope)
    }

    #[test]
    fn test_failing_strategy_uses_frequency_fallback() {
        let mut history = draws(30);
        history.push(Draw::new(vec![1, 3, 5, 8, 10]));
        history.push(Draw::new(vec![1, 3, 5, 8, 10]));
        let window = DrawWindow::new(&history);
        let expected = frequency_ranked(&window.frequencies(), &NumberSet::default());

        for failure in [Failure::Panic, Failure::Model] {
            let sets = run_broken(failure, &history).unwrap();
            assert_eq!(sets.len(), 1);
            assert_eq!(sets[0].numbers().to_vec(), {
                let mut top = expected[..PICK_SIZE].to_vec();
                top.sort_unstable();
                top
            });
        }

        assert!(matches!(
            run_broken(Failure::Shortfall, &history),
            Err(OracleError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_analyze_requires_fifty_draws() {
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        assert!(oracle.analyze(&draws(49)).is_err());
        let report = oracle.analyze(&draws(60)).unwrap();
        assert_eq!(report.data_points_used, 60);
        assert_eq!(report.patterns.draws_analyzed, 50);
    }
}
