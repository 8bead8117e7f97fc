use crate::config::FeatureConfig;
use crate::error::Result;
use crate::ml::features::{FeatureExtractor, FEATURE_COUNT};
use crate::types::NumberSet;
use crate::utils::Deadline;

/// Feature rows with binary "appeared in the next draw" labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    pub rows: Vec<[f64; FEATURE_COUNT]>,
    pub labels: Vec<u8>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn push(&mut self, row: [f64; FEATURE_COUNT], label: u8) {
        self.rows.push(row);
        self.labels.push(label);
    }
}

/// Builds the training set one step at a time: features from the history
/// ending at `t - 1`, labels from draw `t`.
pub struct SlidingWindowLabeler {
    extractor: FeatureExtractor,
    lookback: usize,
    max_steps: usize,
}

impl SlidingWindowLabeler {
    pub fn new(features: FeatureConfig, max_steps: usize) -> Self {
        let lookback = features.lookback;
        Self {
            extractor: FeatureExtractor::new(features),
            lookback,
            max_steps,
        }
    }

    /// First step used for `n` draws, honouring the training-step cap.
    pub fn first_step(&self, n: usize) -> usize {
        self.lookback.max(n.saturating_sub(self.max_steps))
    }

    pub fn build(&self, draws: &[NumberSet], deadline: &Deadline) -> Result<LabeledDataset> {
        let mut dataset = LabeledDataset::default();
        let first = self.first_step(draws.len());

        for (i, t) in (first..draws.len()).enumerate() {
            if i % 16 == 0 {
                deadline.check()?;
            }
            let table = self.extractor.extract(&draws[..t]);
            let target = &draws[t];
            for record in table.records() {
                dataset.push(record.to_vector(), u8::from(target.contains(record.number)));
            }
        }

        log::debug!(
            "Labeled {} rows ({} positive) from {} steps",
            dataset.len(),
            dataset.positives(),
            draws.len().saturating_sub(first)
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_come_from_the_next_draw() {
        let mut draws = vec![NumberSet::from_slice(&[1, 2, 3, 4, 5]); 52];
        draws.push(NumberSet::from_slice(&[10, 20, 30, 40, 50]));
        let config = FeatureConfig::default();
        let labeler = SlidingWindowLabeler::new(config, 120);

        let dataset = labeler.build(&draws, &Deadline::unbounded()).unwrap();
        // steps t = 50, 51, 52
        assert_eq!(dataset.len(), 3 * 90);
        assert_eq!(dataset.positives(), 15);
        // last step labels 10 (row index 2*90 + 9)
        assert_eq!(dataset.labels[2 * 90 + 9], 1);
        assert_eq!(dataset.labels[2 * 90], 0);
        // its features still see number 1 as frequent
        assert_eq!(dataset.rows[2 * 90][0], 1.0);
    }

    #[test]
    fn test_step_cap() {
        let labeler = SlidingWindowLabeler::new(FeatureConfig::default(), 10);
        assert_eq!(labeler.first_step(200), 190);
        assert_eq!(labeler.first_step(55), 50);
    }
}
