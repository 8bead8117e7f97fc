use crate::config::RegimeConfig;
use crate::engines::analysis::panel_sum;
use crate::engines::evaluation::gaps::gaps;
use crate::functions::primitives::{entropy, mean};
use crate::types::{NumberSet, HIGH_THRESHOLD};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Independent tests combined under the Bonferroni correction.
const TESTS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeReport {
    pub detected: bool,
    pub confidence: f64,
    pub details: Option<RegimeDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeDetails {
    pub short_draws: usize,
    pub baseline_draws: usize,
    pub short_sum_mean: f64,
    pub baseline_sum_mean: f64,
    pub sum_p_value: f64,
    pub short_high_share: f64,
    pub baseline_high_share: f64,
    pub high_share_p_value: f64,
    pub short_gap_entropy: f64,
    pub baseline_gap_entropy: f64,
    /// Smallest p-value after the Bonferroni adjustment.
    pub adjusted_p_value: f64,
}

impl RegimeReport {
    fn not_enough() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            details: None,
        }
    }
}

pub struct RegimeDetector {
    config: RegimeConfig,
}

impl RegimeDetector {
    pub fn new(config: RegimeConfig) -> Self {
        Self { config }
    }

    pub fn required_draws(&self) -> usize {
        self.config.short_window + self.config.min_baseline
    }

    /// Compare the last `short_window` draws to up to `long_window` draws
    /// before them. Informational only.
    pub fn detect(&self, draws: &[NumberSet]) -> RegimeReport {
        if draws.len() < self.required_draws() {
            log::debug!(
                "regime check skipped: {} draws, need {}",
                draws.len(),
                self.required_draws()
            );
            return RegimeReport::not_enough();
        }

        let split = draws.len() - self.config.short_window;
        let baseline_start = split.saturating_sub(self.config.long_window);
        let short = &draws[split..];
        let baseline = &draws[baseline_start..split];

        let short_sums = sums(short);
        let baseline_sums = sums(baseline);
        let sum_p_value = welch_p_value(&short_sums, &baseline_sums);

        let (short_high, short_total) = high_counts(short);
        let (base_high, base_total) = high_counts(baseline);
        let high_share_p_value = two_proportion_p_value(short_high, short_total, base_high, base_total);

        let adjusted = (sum_p_value.min(high_share_p_value) * TESTS).min(1.0);
        let detected = adjusted < self.config.alpha;

        let details = RegimeDetails {
            short_draws: short.len(),
            baseline_draws: baseline.len(),
            short_sum_mean: mean(&short_sums),
            baseline_sum_mean: mean(&baseline_sums),
            sum_p_value,
            short_high_share: share(short_high, short_total),
            baseline_high_share: share(base_high, base_total),
            high_share_p_value,
            short_gap_entropy: gap_entropy(short),
            baseline_gap_entropy: gap_entropy(baseline),
            adjusted_p_value: adjusted,
        };
        if detected {
            log::info!(
                "regime change detected (adjusted p {:.2e}, sum mean {:.1} vs {:.1})",
                adjusted,
                details.short_sum_mean,
                details.baseline_sum_mean
            );
        }

        RegimeReport {
            detected,
            confidence: 1.0 - adjusted,
            details: Some(details),
        }
    }
}

fn sums(draws: &[NumberSet]) -> Vec<f64> {
    draws.iter().map(|d| panel_sum(d) as f64).collect()
}

fn high_counts(draws: &[NumberSet]) -> (usize, usize) {
    let high = draws
        .iter()
        .map(|d| d.iter().filter(|&n| n > HIGH_THRESHOLD).count())
        .sum();
    let total = draws.iter().map(|d| d.len()).sum();
    (high, total)
}

fn share(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

fn gap_entropy(draws: &[NumberSet]) -> f64 {
    let mut histogram = vec![0usize; 91];
    for draw in draws {
        for g in gaps(&draw.to_vec()) {
            histogram[g as usize] += 1;
        }
    }
    entropy(&histogram)
}

fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Two-sided Welch t-test p-value for a difference in means.
pub fn welch_p_value(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return 1.0;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (va, vb) = (sample_variance(a) / na, sample_variance(b) / nb);
    let diff = mean(a) - mean(b);
    let se = (va + vb).sqrt();
    if se == 0.0 {
        return if diff == 0.0 { 1.0 } else { 0.0 };
    }

    let t = diff / se;
    let df = (va + vb).powi(2) / (va.powi(2) / (na - 1.0) + vb.powi(2) / (nb - 1.0));
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

/// Two-sided pooled z-test p-value for a difference in proportions.
pub fn two_proportion_p_value(x1: usize, n1: usize, x2: usize, n2: usize) -> f64 {
    if n1 == 0 || n2 == 0 {
        return 1.0;
    }
    let (p1, p2) = (share(x1, n1), share(x2, n2));
    let pooled = (x1 + x2) as f64 / (n1 + n2) as f64;
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    if se == 0.0 {
        return 1.0;
    }
    let z = (p1 - p2) / se;
    match Normal::new(0.0, 1.0) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(z.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}
