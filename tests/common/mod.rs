#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use lotto_oracle::config::{OracleConfig, Oversampling};
use lotto_oracle::Draw;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(i as i64)
}

/// Five distinct numbers from `1..=90` excluding `skip`.
pub fn panel(rng: &mut StdRng, skip: &[u8]) -> Vec<u8> {
    let allowed: Vec<u8> = (1..=90u8).filter(|n| !skip.contains(n)).collect();
    sample(rng, allowed.len(), 5)
        .into_iter()
        .map(|i| allowed[i])
        .collect()
}

/// Uniform dated draws, each with a machine panel.
pub fn draws(n: usize, seed: u64) -> Vec<Draw> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let winning = panel(&mut rng, &[]);
            let machine = panel(&mut rng, &[]);
            Draw::new(winning).with_machine(machine).with_date(day(i))
        })
        .collect()
}

/// Uniform dated draws without machine panels.
pub fn winning_only(n: usize, seed: u64) -> Vec<Draw> {
    draws(n, seed)
        .into_iter()
        .map(|mut d| {
            d.machine = None;
            d
        })
        .collect()
}

/// `n` draws where `number` only appears in the last `recent` winning panels.
pub fn recent_burst(n: usize, number: u8, recent: usize, seed: u64) -> Vec<Draw> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let winning = if i >= n - recent {
                let mut p = panel(&mut rng, &[number])[..4].to_vec();
                p.push(number);
                p
            } else {
                panel(&mut rng, &[number])
            };
            Draw::new(winning).with_date(day(i))
        })
        .collect()
}

/// Dated draws where every `planted` number is in four of every five
/// winning panels; the rest of each panel is uniform.
pub fn planted(n: usize, planted: &[u8], seed: u64) -> Vec<Draw> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let mut winning = panel(&mut rng, planted);
            if i % 5 != 4 {
                winning.truncate(5 - planted.len());
                winning.extend_from_slice(planted);
            }
            let machine = panel(&mut rng, &[]);
            Draw::new(winning).with_machine(machine).with_date(day(i))
        })
        .collect()
}

/// Small learners and a short search so the full pipeline runs quickly.
pub fn fast_config() -> OracleConfig {
    let mut config = OracleConfig::default();
    config.ml.forest.n_trees = 5;
    config.ml.max_training_steps = 15;
    config.ml.boosting.rounds = 8;
    config.ml.oversampling = Oversampling::Random;
    config.genetic.population_size = 30;
    config.genetic.generations = 8;
    config.timeout.enabled = false;
    config
}
