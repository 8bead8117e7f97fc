use crate::types::{NumberSet, MAX_NUMBER};
use serde::Serialize;
use std::cmp::Ordering;

const WINDOWS: [usize; 3] = [5, 10, 20];
const TREND_BAND: f64 = 0.05;
const ACCELERATION_BAND: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Momentum {
    pub number: u8,
    pub momentum: f64,
    pub acceleration: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub rising: Vec<u8>,
    pub falling: Vec<u8>,
    pub accelerating: Vec<u8>,
}

/// Short-vs-long frequency momentum over the 5/10/20 draw windows.
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn momentum(draws: &[NumberSet], number: u8) -> Momentum {
        let longest = WINDOWS[WINDOWS.len() - 1];
        if draws.len() < longest {
            return Momentum {
                number,
                momentum: 0.0,
                acceleration: 0.0,
                direction: TrendDirection::Neutral,
            };
        }

        let freq: Vec<f64> = WINDOWS
            .iter()
            .map(|&w| {
                let recent = &draws[draws.len() - w..];
                recent.iter().filter(|d| d.contains(number)).count() as f64 / w as f64
            })
            .collect();

        let momentum = freq[0] - freq[2];
        let acceleration = (freq[0] - freq[1]) - (freq[1] - freq[2]);
        let direction = if momentum > TREND_BAND {
            TrendDirection::Rising
        } else if momentum < -TREND_BAND {
            TrendDirection::Falling
        } else {
            TrendDirection::Neutral
        };

        Momentum {
            number,
            momentum,
            acceleration,
            direction,
        }
    }

    pub fn trending(draws: &[NumberSet], top_n: usize) -> TrendReport {
        let all: Vec<Momentum> = (1..=MAX_NUMBER).map(|n| Self::momentum(draws, n)).collect();

        let pick = |filter: &dyn Fn(&Momentum) -> bool,
                    order: &dyn Fn(&Momentum, &Momentum) -> Ordering| {
            let mut chosen: Vec<&Momentum> = all.iter().filter(|m| filter(m)).collect();
            chosen.sort_by(|a, b| order(a, b).then(a.number.cmp(&b.number)));
            chosen.into_iter().take(top_n).map(|m| m.number).collect::<Vec<u8>>()
        };

        TrendReport {
            rising: pick(
                &|m| m.direction == TrendDirection::Rising,
                &|a, b| b.momentum.total_cmp(&a.momentum),
            ),
            falling: pick(
                &|m| m.direction == TrendDirection::Falling,
                &|a, b| a.momentum.total_cmp(&b.momentum),
            ),
            accelerating: pick(
                &|m| m.acceleration > ACCELERATION_BAND,
                &|a, b| b.acceleration.total_cmp(&a.acceleration),
            ),
        }
    }
}
