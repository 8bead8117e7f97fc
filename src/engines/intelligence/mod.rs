//! Relationship and state based strategy over machine-qualified draws.
//!
//! Signals (temporal memory, machine lag, burst, pair gravity, families)
//! feed a unified per-number score. Personas propose tickets from those
//! scores; the best scored ticket wins, with Balanced and a plain top-5 as
//! fallbacks so the strategy always answers once its minimum is met.

pub mod gravity;
pub mod personas;
pub mod scoring;
pub mod signals;
pub mod state;

pub use gravity::{Family, FamilyMap, PairGravity};
pub use personas::{Persona, PersonaTicket};
pub use scoring::{IntelligenceModel, NumberProfile, TicketScore};
pub use signals::SignalTable;

use crate::config::IntelligenceConfig;
use crate::engines::strategy::{Strategy, StrategyContext};
use crate::error::Result;
use crate::types::{PredictionSet, StrategyKind, PICK_SIZE};

pub struct IntelligenceEngine {
    config: IntelligenceConfig,
}

impl IntelligenceEngine {
    pub fn new(config: IntelligenceConfig) -> Self {
        Self { config }
    }

    /// Every persona ticket, best first and deduplicated.
    pub fn ranked_tickets(&self, model: &IntelligenceModel) -> Vec<PersonaTicket> {
        let mut tickets: Vec<PersonaTicket> = Vec::new();
        for persona in Persona::ALL {
            match persona.generate(model) {
                Some(numbers) => {
                    let ticket = PersonaTicket::new(persona, numbers, model);
                    if !ticket.score.total.is_finite() {
                        log::warn!("Discarding {:?} ticket with non-finite score", persona);
                        continue;
                    }
                    if !tickets.iter().any(|t| t.numbers == ticket.numbers) {
                        tickets.push(ticket);
                    }
                }
                None => log::debug!("Persona {:?} not applicable", persona),
            }
        }
        tickets.sort_by(|a, b| {
            b.score
                .total
                .total_cmp(&a.score.total)
                .then(a.numbers.cmp(&b.numbers))
        });
        tickets
    }

    /// Top five by unified score, ties broken by co-occurrence with the
    /// leading number.
    pub fn top_unified(model: &IntelligenceModel) -> [u8; PICK_SIZE] {
        let mut ranked = model.ranking().to_vec();
        let leader = ranked[0];
        ranked.sort_by(|&a, &b| {
            model
                .unified(b)
                .total_cmp(&model.unified(a))
                .then(model.gravity.joint_count(leader, b).cmp(&model.gravity.joint_count(leader, a)))
                .then(a.cmp(&b))
        });
        let mut top = [0u8; PICK_SIZE];
        top.copy_from_slice(&ranked[..PICK_SIZE]);
        top.sort_unstable();
        top
    }

    fn select(&self, model: &IntelligenceModel, count: usize) -> Result<Vec<PredictionSet>> {
        let tickets = self.ranked_tickets(model);
        if !tickets.is_empty() {
            log::debug!(
                "Intelligence best ticket {:?} from {:?} (score {:.4})",
                tickets[0].numbers,
                tickets[0].persona,
                tickets[0].score.total
            );
            return tickets
                .iter()
                .take(count.max(1))
                .map(|t| PredictionSet::new(&t.numbers))
                .collect();
        }

        if let Some(balanced) = Persona::Balanced.generate(model) {
            log::warn!("No persona ticket scored, using Balanced directly");
            return Ok(vec![PredictionSet::new(&balanced)?]);
        }

        log::warn!("Balanced persona unavailable, using top unified scores");
        Ok(vec![PredictionSet::new(&Self::top_unified(model))?])
    }
}

impl Strategy for IntelligenceEngine {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Intelligence
    }

    fn data_requirement(&self, ctx: &StrategyContext) -> (usize, usize) {
        (self.config.min_machine_draws, ctx.machine.len())
    }

    fn predict(&self, ctx: &StrategyContext) -> Result<Vec<PredictionSet>> {
        self.check_minimum(ctx)?;
        ctx.deadline.check()?;

        let model = IntelligenceModel::build(ctx.machine, &self.config);
        ctx.deadline.check()?;
        self.select(&model, ctx.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MachineWindow;
    use crate::types::NumberSet;

    fn model() -> IntelligenceModel {
        let mut winning = Vec::new();
        let mut machine = Vec::new();
        for i in 0..60u8 {
            winning.push(NumberSet::from_slice(&[i % 45 + 1, i % 45 + 46, (i * 7) % 90 + 1, 33, 34]));
            machine.push(NumberSet::from_slice(&[(i + 1) % 45 + 1, 80, 81, 82, 83]));
        }
        IntelligenceModel::build(&MachineWindow { winning, machine }, &IntelligenceConfig::default())
    }

    #[test]
    fn test_tickets_sorted_and_distinct() {
        let engine = IntelligenceEngine::new(IntelligenceConfig::default());
        let model = model();
        let tickets = engine.ranked_tickets(&model);
        assert!(!tickets.is_empty());
        assert!(tickets.windows(2).all(|w| w[0].score.total >= w[1].score.total));
        for (i, a) in tickets.iter().enumerate() {
            assert!(tickets[i + 1..].iter().all(|b| b.numbers != a.numbers));
        }
    }

    #[test]
    fn test_top_unified_fallback_is_valid() {
        let top = IntelligenceEngine::top_unified(&model());
        assert_eq!(NumberSet::from_slice(&top).len(), PICK_SIZE);
    }
}
