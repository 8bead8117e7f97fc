use super::gravity::{FamilyMap, PairGravity};
use super::signals::SignalTable;
use super::state::{classify, multiplier};
use crate::config::IntelligenceConfig;
use crate::data::MachineWindow;
use crate::engines::analysis::PatternSummary;
use crate::types::{NumberSet, NumberState, MAX_NUMBER, PICK_SIZE};
use serde::Serialize;

const PAIR_SAMPLE: usize = 5;
const PAIR_SCALE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberProfile {
    pub number: u8,
    pub state: NumberState,
    pub temporal: f64,
    pub lag: f64,
    pub burst: f64,
    pub pair: f64,
    pub family: f64,
    pub recency: f64,
    pub unified: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketScore {
    pub base: f64,
    pub pair_synergy: f64,
    pub family_coherence: f64,
    pub recent_match: f64,
    pub sum_range: f64,
    pub redundancy_penalty: f64,
    /// Anchor bonus, negative when the ticket holds no anchor.
    pub anchor: f64,
    pub total: f64,
}

/// Every intelligence signal for one request, computed once.
pub struct IntelligenceModel {
    pub signals: SignalTable,
    pub gravity: PairGravity,
    pub families: FamilyMap,
    profiles: Vec<NumberProfile>,
    ranking: Vec<u8>,
    recent: Vec<NumberSet>,
    anchors: NumberSet,
    sum_range: (u32, u32),
    config: IntelligenceConfig,
}

impl IntelligenceModel {
    pub fn build(window: &MachineWindow, config: &IntelligenceConfig) -> Self {
        let signals = SignalTable::compute(window, config);
        let gravity = PairGravity::compute(&window.winning, config.min_joint_count);
        let families = FamilyMap::detect(&gravity, config.min_family_gravity, config.family_max_iterations);
        let top_temporal: Vec<u8> = SignalTable::ranked_by(&signals.temporal);

        let profiles = (1..=MAX_NUMBER)
            .map(|n| {
                let state = classify(n, &signals, &config.thresholds);
                let temporal = signals.normalized_temporal(n);
                let lag = signals.normalized_lag(n);
                let burst = signals.normalized_burst(n);

                let partners: Vec<u8> = top_temporal.iter().copied().filter(|&m| m != n).take(PAIR_SAMPLE).collect();
                let mean_gravity = if partners.is_empty() {
                    0.0
                } else {
                    partners.iter().map(|&m| gravity.support(n, m)).sum::<f64>() / partners.len() as f64
                };
                let pair = (mean_gravity / PAIR_SCALE).min(1.0);

                let family = families
                    .family_of(n)
                    .map(|f| {
                        f.members()
                            .into_iter()
                            .filter(|&m| m != n)
                            .map(|m| signals.normalized_temporal(m))
                            .fold(0.0, f64::max)
                    })
                    .unwrap_or(0.0);

                let recency = config.recency_boost * (-config.decay_lambda * signals.since_win[n as usize] as f64).exp();

                let w = &config.weights;
                let unified = (w.temporal * temporal + w.lag * lag + w.burst * burst + w.pair * pair + w.family * family + recency)
                    * multiplier(state, &config.multipliers);

                NumberProfile {
                    number: n,
                    state,
                    temporal,
                    lag,
                    burst,
                    pair,
                    family,
                    recency,
                    unified,
                }
            })
            .collect::<Vec<_>>();

        let mut ranking: Vec<u8> = (1..=MAX_NUMBER).collect();
        ranking.sort_by(|&a, &b| {
            profiles[b as usize - 1]
                .unified
                .total_cmp(&profiles[a as usize - 1].unified)
                .then(a.cmp(&b))
        });

        let recent_start = window.len().saturating_sub(config.tickets.recent_match_window);
        let recent = window.winning[recent_start..].to_vec();
        let sum_range = PatternSummary::from_window(&window.winning).sum_range;
        let anchors = NumberSet::from_slice(
            &top_temporal
                .iter()
                .copied()
                .filter(|&n| signals.temporal[n as usize] > 0.0)
                .take(config.tickets.anchor_pool)
                .collect::<Vec<_>>(),
        );

        Self {
            signals,
            gravity,
            families,
            profiles,
            ranking,
            recent,
            anchors,
            sum_range,
            config: config.clone(),
        }
    }

    pub fn profile(&self, n: u8) -> &NumberProfile {
        &self.profiles[(n.clamp(1, MAX_NUMBER) - 1) as usize]
    }

    pub fn profiles(&self) -> &[NumberProfile] {
        &self.profiles
    }

    pub fn unified(&self, n: u8) -> f64 {
        self.profile(n).unified
    }

    /// Numbers by unified score desc, number asc.
    pub fn ranking(&self) -> &[u8] {
        &self.ranking
    }

    pub fn state(&self, n: u8) -> NumberState {
        self.profile(n).state
    }

    pub fn score_ticket(&self, ticket: &[u8; PICK_SIZE]) -> TicketScore {
        let bonuses = &self.config.tickets;
        let base: f64 = ticket.iter().map(|&n| self.unified(n)).sum();

        let mut strong_pairs = 0usize;
        let mut pair_synergy = 0.0;
        for (idx, &a) in ticket.iter().enumerate() {
            for &b in &ticket[idx + 1..] {
                if let Some(g) = self.gravity.get(a, b) {
                    if g >= bonuses.strong_pair_gravity {
                        strong_pairs += 1;
                        pair_synergy += (g - 1.0) * bonuses.pair_synergy_factor;
                    }
                }
            }
        }
        if strong_pairs >= bonuses.amplify_after_pairs {
            pair_synergy *= bonuses.synergy_amplifier;
        }

        let family_coherence: f64 = self
            .families
            .families()
            .iter()
            .map(|f| ticket.iter().filter(|&&n| f.contains(n)).count())
            .filter(|&members| members >= bonuses.family_min_members)
            .map(|members| members as f64 * bonuses.family_member_bonus)
            .sum();

        let set = NumberSet::from_slice(ticket);
        let recent_match = if self.recent.iter().any(|d| d.overlap(&set) >= bonuses.recent_match_min) {
            bonuses.recent_match_bonus
        } else {
            0.0
        };

        let sum: u32 = ticket.iter().map(|&n| n as u32).sum();
        let sum_range = if sum >= self.sum_range.0 && sum <= self.sum_range.1 {
            bonuses.sum_range_bonus
        } else {
            0.0
        };

        let count_state = |s: NumberState| ticket.iter().filter(|&&n| self.state(n) == s).count();
        let mut redundancy_penalty = 0.0;
        if count_state(NumberState::Overheated) > bonuses.max_overheated {
            redundancy_penalty += bonuses.overheated_penalty;
        }
        if count_state(NumberState::Active) > bonuses.max_active {
            redundancy_penalty += bonuses.active_penalty;
        }

        let anchor = if self.anchors.is_empty() {
            0.0
        } else if ticket.iter().any(|&n| self.anchors.contains(n)) {
            bonuses.anchor_bonus
        } else {
            -bonuses.missing_anchor_penalty
        };

        TicketScore {
            base,
            pair_synergy,
            family_coherence,
            recent_match,
            sum_range,
            redundancy_penalty,
            anchor,
            total: base + pair_synergy + family_coherence + recent_match + sum_range - redundancy_penalty + anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> MachineWindow {
        let mut winning = Vec::new();
        let mut machine = Vec::new();
        for i in 0..60u8 {
            winning.push(NumberSet::from_slice(&[1, 2, 3, 10 + i % 30, 50 + i % 20]));
            machine.push(NumberSet::from_slice(&[1, 40 + i % 10, 71, 72, 73]));
        }
        MachineWindow { winning, machine }
    }

    #[test]
    fn test_unified_scores_are_bounded_and_ranked() {
        let model = IntelligenceModel::build(&window(), &IntelligenceConfig::default());
        assert_eq!(model.profiles().len(), 90);
        for p in model.profiles() {
            for term in [p.temporal, p.lag, p.burst, p.pair, p.family] {
                assert!((0.0..=1.0).contains(&term), "{:?}", p);
            }
        }
        let ranking = model.ranking();
        assert_eq!(ranking.len(), 90);
        assert!(ranking.windows(2).all(|w| model.unified(w[0]) >= model.unified(w[1])));
        // drawn every time
        assert_eq!(model.state(1), NumberState::Overheated);
        assert_eq!(model.state(90), NumberState::Dormant);
    }

    #[test]
    fn test_ticket_components_add_up() {
        let model = IntelligenceModel::build(&window(), &IntelligenceConfig::default());
        let score = model.score_ticket(&[1, 2, 3, 20, 60]);
        let expected = score.base + score.pair_synergy + score.family_coherence + score.recent_match + score.sum_range
            - score.redundancy_penalty
            + score.anchor;
        assert!((score.total - expected).abs() < 1e-12);
        // three always-drawn numbers match every recent draw
        assert_eq!(score.recent_match, 0.5);
        // 1, 2 and 3 are all overheated
        assert_eq!(score.redundancy_penalty, 0.5);
        assert_eq!(score.anchor, 0.2);
    }

    #[test]
    fn test_ticket_without_anchor_is_penalised() {
        let model = IntelligenceModel::build(&window(), &IntelligenceConfig::default());
        // never drawn, so outside the temporal top ten
        let score = model.score_ticket(&[85, 86, 87, 88, 89]);
        assert_eq!(score.anchor, -0.3);

        let mut config = IntelligenceConfig::default();
        config.tickets.missing_anchor_penalty = 0.0;
        let lenient = IntelligenceModel::build(&window(), &config);
        assert_eq!(lenient.score_ticket(&[85, 86, 87, 88, 89]).anchor, 0.0);
    }
}
