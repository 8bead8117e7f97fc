use crate::config::{IntelligenceConfig, StateThresholds};
use crate::data::MachineWindow;
use crate::ml::features::skip_of;
use crate::types::MAX_NUMBER;
use serde::Serialize;

const EPS: f64 = 1e-6;

/// Raw per-number signals over the machine-qualified window. All vectors
/// are indexed by number; index 0 is unused.
#[derive(Debug, Clone, Serialize)]
pub struct SignalTable {
    pub draws: usize,
    pub temporal: Vec<f64>,
    pub lag: Vec<f64>,
    pub burst: Vec<f64>,
    pub wins: Vec<u32>,
    pub recent_wins: Vec<u32>,
    pub recent_machine_hits: Vec<u32>,
    /// Draws since the last win; the window length when never won.
    pub since_win: Vec<u32>,
}

impl SignalTable {
    pub fn compute(window: &MachineWindow, config: &IntelligenceConfig) -> Self {
        let len = MAX_NUMBER as usize + 1;
        let mut table = Self {
            draws: window.len(),
            temporal: vec![0.0; len],
            lag: vec![0.0; len],
            burst: vec![0.0; len],
            wins: vec![0; len],
            recent_wins: vec![0; len],
            recent_machine_hits: vec![0; len],
            since_win: vec![0; len],
        };

        for n in 1..=MAX_NUMBER {
            let i = n as usize;
            table.temporal[i] = temporal_memory(window, n, config.decay_lambda);
            table.lag[i] = lag_signature(window, n, &config.lag_weights);
            table.burst[i] = burst_index(window, n, config.burst_window);
            table.wins[i] = window.winning.iter().filter(|d| d.contains(n)).count() as u32;
            table.since_win[i] = skip_of(&window.winning, n);
            fill_recent(&mut table, window, n, &config.thresholds);
        }
        table
    }

    pub fn normalized_temporal(&self, n: u8) -> f64 {
        normalize(&self.temporal, n)
    }

    pub fn normalized_lag(&self, n: u8) -> f64 {
        normalize(&self.lag, n)
    }

    pub fn normalized_burst(&self, n: u8) -> f64 {
        normalize(&self.burst, n)
    }

    /// Numbers ranked by one signal, desc then number asc.
    pub fn ranked_by(values: &[f64]) -> Vec<u8> {
        let mut numbers: Vec<u8> = (1..=MAX_NUMBER).collect();
        numbers.sort_by(|&a, &b| values[b as usize].total_cmp(&values[a as usize]).then(a.cmp(&b)));
        numbers
    }
}

fn fill_recent(table: &mut SignalTable, window: &MachineWindow, n: u8, thresholds: &StateThresholds) {
    let start = window.len().saturating_sub(thresholds.recent_window);
    let i = n as usize;
    table.recent_wins[i] = window.winning[start..].iter().filter(|d| d.contains(n)).count() as u32;
    table.recent_machine_hits[i] = window.machine[start..].iter().filter(|d| d.contains(n)).count() as u32;
}

/// Max-normalized to 0..1; 0 when every value is 0.
fn normalize(values: &[f64], n: u8) -> f64 {
    let max = values.iter().cloned().fold(0.0, f64::max);
    if max <= 0.0 {
        return 0.0;
    }
    values[n as usize] / max
}

/// `Σ exp(−λ·Δt)` over every win, Δt = draws from that win to the end.
pub fn temporal_memory(window: &MachineWindow, n: u8, lambda: f64) -> f64 {
    let t = window.len();
    window
        .winning
        .iter()
        .enumerate()
        .filter(|(_, d)| d.contains(n))
        .map(|(i, _)| (-lambda * (t - i - 1) as f64).exp())
        .sum()
}

/// `max_l w_l · P(win at t | machine at t−l)` for lags 1..=3.
pub fn lag_signature(window: &MachineWindow, n: u8, weights: &[f64; 3]) -> f64 {
    let mut best = 0.0f64;
    for (l, weight) in weights.iter().enumerate() {
        let lag = l + 1;
        let mut seen = 0u32;
        let mut followed = 0u32;
        for t in lag..window.len() {
            if window.machine[t - lag].contains(n) {
                seen += 1;
                if window.winning[t].contains(n) {
                    followed += 1;
                }
            }
        }
        if seen > 0 {
            best = best.max(weight * followed as f64 / seen as f64);
        }
    }
    best
}

/// Recent wins over the mean inter-win gap; 0 with fewer than two wins.
pub fn burst_index(window: &MachineWindow, n: u8, burst_window: usize) -> f64 {
    let wins: Vec<usize> = window
        .winning
        .iter()
        .enumerate()
        .filter(|(_, d)| d.contains(n))
        .map(|(i, _)| i)
        .collect();
    if wins.len() < 2 {
        return 0.0;
    }
    let gaps: usize = wins.windows(2).map(|w| w[1] - w[0]).sum();
    let mean_gap = gaps as f64 / (wins.len() - 1) as f64;
    let start = window.len().saturating_sub(burst_window);
    let recent = wins.iter().filter(|&&i| i >= start).count();
    recent as f64 / (mean_gap + EPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumberSet;

    fn window(pairs: &[(&[u8], &[u8])]) -> MachineWindow {
        MachineWindow {
            winning: pairs.iter().map(|(w, _)| NumberSet::from_slice(w)).collect(),
            machine: pairs.iter().map(|(_, m)| NumberSet::from_slice(m)).collect(),
        }
    }

    #[test]
    fn test_temporal_memory_decays() {
        let w = window(&[(&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10]), (&[1, 12, 13, 14, 15], &[6, 7, 8, 9, 10])]);
        let expected = 1.0 + (-0.15f64).exp();
        assert!((temporal_memory(&w, 1, 0.15) - expected).abs() < 1e-12);
        assert!((temporal_memory(&w, 2, 0.15) - (-0.15f64).exp()).abs() < 1e-12);
        assert_eq!(temporal_memory(&w, 90, 0.15), 0.0);
    }

    #[test]
    fn test_lag_signature_follows_machine() {
        // machine 7 is always followed by winning 7 one draw later
        let w = window(&[
            (&[1, 2, 3, 4, 5], &[7, 20, 21, 22, 23]),
            (&[7, 30, 31, 32, 33], &[7, 20, 21, 22, 23]),
            (&[7, 40, 41, 42, 43], &[50, 51, 52, 53, 54]),
        ]);
        let lag = lag_signature(&w, 7, &[1.0, 0.7, 0.4]);
        assert!((lag - 1.0).abs() < 1e-12);
        assert_eq!(lag_signature(&w, 20, &[1.0, 0.7, 0.4]), 0.0);
    }

    #[test]
    fn test_burst_needs_two_wins() {
        let w = window(&[
            (&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10]),
            (&[1, 12, 13, 14, 15], &[6, 7, 8, 9, 10]),
            (&[16, 17, 18, 19, 2], &[6, 7, 8, 9, 10]),
        ]);
        assert_eq!(burst_index(&w, 16, 10), 0.0);
        // wins at 0 and 1, gap 1, both recent
        assert!((burst_index(&w, 1, 10) - 2.0 / (1.0 + 1e-6)).abs() < 1e-9);
    }
}
