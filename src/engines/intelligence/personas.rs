use super::scoring::{IntelligenceModel, TicketScore};
use super::signals::SignalTable;
use crate::types::{NumberState, MAX_NUMBER, PICK_SIZE};
use serde::Serialize;

const CORE_RANKS: usize = 15;
const BALANCED_RANKS: usize = 20;
const SIGNAL_RANKS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    StructuralAnchor,
    MachineMemoryHunter,
    ClusterRider,
    BreakoutSpeculator,
    Balanced,
    SignalBlend,
    TemporalLag,
    BreakoutCore,
}

impl Persona {
    /// Priority order; hybrids last.
    pub const ALL: [Persona; 8] = [
        Persona::StructuralAnchor,
        Persona::MachineMemoryHunter,
        Persona::ClusterRider,
        Persona::BreakoutSpeculator,
        Persona::Balanced,
        Persona::SignalBlend,
        Persona::TemporalLag,
        Persona::BreakoutCore,
    ];

    pub fn is_hybrid(&self) -> bool {
        matches!(self, Persona::SignalBlend | Persona::TemporalLag | Persona::BreakoutCore)
    }

    /// Five numbers in selection order, or `None` when the window does not
    /// support this persona.
    pub fn generate(&self, model: &IntelligenceModel) -> Option<[u8; PICK_SIZE]> {
        let ranking = model.ranking();
        let picks = match self {
            Persona::StructuralAnchor => {
                let steady: Vec<u8> = ranking
                    .iter()
                    .take(CORE_RANKS)
                    .copied()
                    .filter(|&n| matches!(model.state(n), NumberState::Active | NumberState::Warming))
                    .collect();
                if steady.len() < PICK_SIZE {
                    return None;
                }
                steady
            }
            Persona::MachineMemoryHunter => {
                let mut picks = top(&SignalTable::ranked_by(&model.signals.lag), 3);
                extend_from(&mut picks, &ranking[..CORE_RANKS], 2);
                picks
            }
            Persona::ClusterRider => {
                let family = model.families.largest().filter(|f| f.len() >= 3)?;
                let mut members = family.members();
                members.sort_by(|&a, &b| model.unified(b).total_cmp(&model.unified(a)).then(a.cmp(&b)));
                // anchor first, then the strongest satellites
                let mut picks = vec![family.anchor];
                extend_from(&mut picks, &members, 2);
                extend_from(&mut picks, &ranking[..CORE_RANKS], 2);
                picks
            }
            Persona::BreakoutSpeculator => {
                let breakout = in_state(model, &[NumberState::Breakout]);
                if breakout.len() < 2 {
                    return None;
                }
                let mut picks = top(&breakout, 2);
                extend_from(&mut picks, &SignalTable::ranked_by(&model.signals.lag)[..SIGNAL_RANKS], 3);
                picks
            }
            Persona::Balanced => {
                let pool = &ranking[..BALANCED_RANKS];
                let mut picks = top(ranking, 2);
                extend_from(&mut picks, &SignalTable::ranked_by(&model.signals.lag)[..SIGNAL_RANKS], 1);
                extend_from(&mut picks, &SignalTable::ranked_by(&model.signals.burst)[..SIGNAL_RANKS], 1);
                let family_pick: Vec<u8> = pool
                    .iter()
                    .copied()
                    .filter(|&n| model.families.family_of(n).is_some())
                    .collect();
                extend_from(&mut picks, &family_pick, 1);
                picks
            }
            Persona::SignalBlend => {
                let blend: Vec<f64> = (0..=MAX_NUMBER)
                    .map(|n| {
                        if n == 0 {
                            return 0.0;
                        }
                        let p = model.profile(n);
                        (p.temporal + p.lag + p.burst) / 3.0
                    })
                    .collect();
                top(&SignalTable::ranked_by(&blend), PICK_SIZE)
            }
            Persona::TemporalLag => {
                let mut picks = top(&SignalTable::ranked_by(&model.signals.temporal), 3);
                extend_from(&mut picks, &SignalTable::ranked_by(&model.signals.lag), 2);
                picks
            }
            Persona::BreakoutCore => {
                let rising = in_state(model, &[NumberState::Breakout, NumberState::Warming]);
                if rising.len() < 2 {
                    return None;
                }
                let mut picks = top(ranking, 3);
                extend_from(&mut picks, &rising, 2);
                picks
            }
        };
        complete(picks, ranking)
    }
}

/// A scored persona candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaTicket {
    pub persona: Persona,
    pub numbers: [u8; PICK_SIZE],
    pub score: TicketScore,
}

impl PersonaTicket {
    pub fn new(persona: Persona, numbers: [u8; PICK_SIZE], model: &IntelligenceModel) -> Self {
        let score = model.score_ticket(&numbers);
        Self {
            persona,
            numbers,
            score,
        }
    }
}

fn top(ranked: &[u8], n: usize) -> Vec<u8> {
    ranked.iter().take(n).copied().collect()
}

/// Append up to `n` numbers from `source` not already picked.
fn extend_from(picks: &mut Vec<u8>, source: &[u8], n: usize) {
    let mut added = 0;
    for &candidate in source {
        if added == n {
            break;
        }
        if !picks.contains(&candidate) {
            picks.push(candidate);
            added += 1;
        }
    }
}

/// Numbers in one of `states`, by unified rank.
fn in_state(model: &IntelligenceModel, states: &[NumberState]) -> Vec<u8> {
    model
        .ranking()
        .iter()
        .copied()
        .filter(|&n| states.contains(&model.state(n)))
        .collect()
}

/// Pad to five distinct numbers from the unified ranking, then sort.
fn complete(mut picks: Vec<u8>, ranking: &[u8]) -> Option<[u8; PICK_SIZE]> {
    picks.truncate(PICK_SIZE);
    let missing = PICK_SIZE - picks.len();
    extend_from(&mut picks, ranking, missing);
    picks.sort_unstable();
    picks.try_into().ok()
}
