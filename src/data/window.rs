use super::validator::DrawValidator;
use crate::functions::ranking::frequency_counts;
use crate::types::{Draw, NumberSet};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Set-based view over a validated, chronologically ordered window of draws.
#[derive(Debug, Clone, Default)]
pub struct DrawWindow {
    winning: Vec<NumberSet>,
    machine: Vec<Option<NumberSet>>,
}

/// Draws whose machine panel is well formed, paired with their winning panel.
#[derive(Debug, Clone, Default)]
pub struct MachineWindow {
    pub winning: Vec<NumberSet>,
    pub machine: Vec<NumberSet>,
}

impl DrawWindow {
    pub fn new(draws: &[Draw]) -> Self {
        let winning = draws
            .iter()
            .map(|d| NumberSet::from_slice(&d.winning))
            .collect();
        let machine = draws
            .iter()
            .map(|d| match &d.machine {
                Some(panel) if DrawValidator::is_well_formed_panel(panel) => {
                    Some(NumberSet::from_slice(panel))
                }
                _ => None,
            })
            .collect();
        Self { winning, machine }
    }

    pub fn from_sets(winning: Vec<NumberSet>) -> Self {
        let machine = vec![None; winning.len()];
        Self { winning, machine }
    }

    pub fn len(&self) -> usize {
        self.winning.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winning.is_empty()
    }

    pub fn winning(&self) -> &[NumberSet] {
        &self.winning
    }

    pub fn machine(&self) -> &[Option<NumberSet>] {
        &self.machine
    }

    /// Last `n` winning panels (or all of them when shorter).
    pub fn recent(&self, n: usize) -> &[NumberSet] {
        let start = self.winning.len().saturating_sub(n);
        &self.winning[start..]
    }

    pub fn machine_qualified(&self) -> MachineWindow {
        let mut out = MachineWindow::default();
        for (win, machine) in self.winning.iter().zip(&self.machine) {
            if let Some(machine) = machine {
                out.winning.push(*win);
                out.machine.push(*machine);
            }
        }
        out
    }

    /// Winning-panel appearances per number, indexed by number.
    pub fn frequencies(&self) -> [u32; 91] {
        frequency_counts(&self.winning)
    }

    /// Order-sensitive fingerprint of the winning panels.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.winning.hash(&mut hasher);
        hasher.finish()
    }
}

impl MachineWindow {
    pub fn len(&self) -> usize {
        self.winning.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winning.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_qualified_filters_malformed_panels() {
        let draws = vec![
            Draw::new(vec![1, 2, 3, 4, 5]).with_machine(vec![6, 7, 8, 9, 10]),
            Draw::new(vec![11, 12, 13, 14, 15]).with_machine(vec![6, 7, 8]),
            Draw::new(vec![21, 22, 23, 24, 25]),
            Draw::new(vec![31, 32, 33, 34, 35]).with_machine(vec![6, 7, 8, 9, 95]),
            Draw::new(vec![41, 42, 43, 44, 45]).with_machine(vec![1, 1, 2, 3, 4]),
        ];
        let window = DrawWindow::new(&draws);
        let qualified = window.machine_qualified();
        assert_eq!(window.len(), 5);
        assert_eq!(qualified.len(), 2);
        assert!(qualified.winning[1].contains(41));
        assert_eq!(qualified.machine[1].len(), 4);
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let a = DrawWindow::from_sets(vec![
            NumberSet::from_slice(&[1, 2, 3, 4, 5]),
            NumberSet::from_slice(&[6, 7, 8, 9, 10]),
        ]);
        let b = DrawWindow::from_sets(vec![
            NumberSet::from_slice(&[6, 7, 8, 9, 10]),
            NumberSet::from_slice(&[1, 2, 3, 4, 5]),
        ]);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }
}
