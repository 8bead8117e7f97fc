use super::genome::Genome;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq)]
pub struct Elite {
    pub genome: Genome,
    pub fitness: f64,
}

/// Best distinct genomes seen so far, fitness desc then genome asc.
pub struct HallOfFame {
    entries: Vec<Elite>,
    max_size: usize,
    seen: HashSet<Genome>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            seen: HashSet::new(),
        }
    }

    /// Attempt to add a genome; duplicates and genomes worse than a full
    /// hall are rejected.
    pub fn try_add(&mut self, elite: Elite) -> bool {
        if self.max_size == 0 || self.seen.contains(&elite.genome) {
            return false;
        }
        if self.entries.len() >= self.max_size {
            if let Some(worst) = self.entries.last() {
                if compare(&elite, worst) != Ordering::Less {
                    return false;
                }
            }
        }

        self.seen.insert(elite.genome);
        self.entries.push(elite);
        self.entries.sort_by(compare);

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen.remove(&removed.genome);
            }
        }
        true
    }

    pub fn get_all(&self) -> &[Elite] {
        &self.entries
    }

    pub fn get_top_n(&self, n: usize) -> &[Elite] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compare(a: &Elite, b: &Elite) -> Ordering {
    b.fitness.total_cmp(&a.fitness).then(a.genome.cmp(&b.genome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elite(genome: Genome, fitness: f64) -> Elite {
        Elite { genome, fitness }
    }

    #[test]
    fn test_dedup_and_trim() {
        let mut hof = HallOfFame::new(2);
        assert!(hof.try_add(elite([1, 3, 5, 7, 9], 1.0)));
        assert!(!hof.try_add(elite([1, 3, 5, 7, 9], 2.0)));
        assert!(hof.try_add(elite([2, 4, 6, 8, 10], 3.0)));
        assert!(hof.try_add(elite([11, 13, 15, 17, 19], 2.0)));
        assert_eq!(hof.len(), 2);
        assert_eq!(hof.get_all()[0].genome, [2, 4, 6, 8, 10]);
        assert_eq!(hof.get_all()[1].genome, [11, 13, 15, 17, 19]);
        assert!(!hof.try_add(elite([21, 23, 25, 27, 29], 0.5)));
        // evicted genomes may come back
        assert!(hof.try_add(elite([1, 3, 5, 7, 9], 2.5)));
        assert_eq!(hof.get_top_n(1)[0].fitness, 3.0);
    }

    #[test]
    fn test_ties_break_on_genome() {
        let mut hof = HallOfFame::new(3);
        hof.try_add(elite([5, 15, 25, 35, 45], 1.0));
        hof.try_add(elite([1, 15, 25, 35, 45], 1.0));
        assert_eq!(hof.get_all()[0].genome, [1, 15, 25, 35, 45]);
    }
}
