use super::signals::SignalTable;
use crate::config::{StateMultipliers, StateThresholds};
use crate::types::NumberState;

/// First matching rule wins: Overheated, Active, Breakout, Warming, Dormant.
pub fn classify(n: u8, signals: &SignalTable, thresholds: &StateThresholds) -> NumberState {
    let i = n as usize;
    let recent_wins = signals.recent_wins[i] as usize;
    let machine_hits = signals.recent_machine_hits[i] as usize;
    let lag = signals.lag[i];

    if recent_wins >= thresholds.overheated_wins {
        NumberState::Overheated
    } else if recent_wins >= 1 || (machine_hits >= thresholds.active_machine_hits && lag > thresholds.active_lag) {
        NumberState::Active
    } else if signals.since_win[i] as usize > thresholds.breakout_gap && (machine_hits >= 1 || lag > thresholds.breakout_lag) {
        NumberState::Breakout
    } else if machine_hits >= 1 || lag > thresholds.warming_lag || signals.normalized_temporal(n) > thresholds.warming_temporal {
        NumberState::Warming
    } else {
        NumberState::Dormant
    }
}

pub fn multiplier(state: NumberState, multipliers: &StateMultipliers) -> f64 {
    match state {
        NumberState::Active => multipliers.active,
        NumberState::Warming => multipliers.warming,
        NumberState::Breakout => multipliers.breakout,
        NumberState::Overheated => multipliers.overheated,
        NumberState::Dormant => multipliers.dormant,
    }
}
