//! Pair gravity and family clustering.
//!
//! Gravity is `P(i∧j) / (P(i)·P(j))` over the winning panels. Only pairs
//! drawn together at least `min_joint_count` times carry a gravity; the
//! rest are neutral.

use crate::types::{NumberSet, MAX_NUMBER};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeMap;

const SIDE: usize = MAX_NUMBER as usize + 1;

#[derive(Debug, Clone)]
pub struct PairGravity {
    joint: Vec<u32>,
    gravity: Vec<Option<f64>>,
}

impl PairGravity {
    pub fn compute(winning: &[NumberSet], min_joint_count: usize) -> Self {
        let mut counts = [0u32; SIDE];
        let mut joint = vec![0u32; SIDE * SIDE];
        for draw in winning {
            let members = draw.to_vec();
            for (a_idx, &a) in members.iter().enumerate() {
                counts[a as usize] += 1;
                for &b in &members[a_idx + 1..] {
                    joint[a as usize * SIDE + b as usize] += 1;
                    joint[b as usize * SIDE + a as usize] += 1;
                }
            }
        }

        let total = winning.len() as f64;
        let mut gravity = vec![None; SIDE * SIDE];
        for i in 1..SIDE {
            for j in 1..SIDE {
                let together = joint[i * SIDE + j];
                if i == j || (together as usize) < min_joint_count.max(1) {
                    continue;
                }
                let denom = counts[i] as f64 * counts[j] as f64;
                if denom > 0.0 {
                    gravity[i * SIDE + j] = Some(together as f64 * total / denom);
                }
            }
        }
        Self { joint, gravity }
    }

    /// Gravity of a meaningful pair.
    pub fn get(&self, i: u8, j: u8) -> Option<f64> {
        self.gravity.get(i as usize * SIDE + j as usize).copied().flatten()
    }

    /// Gravity for support terms; neutral pairs contribute 0.
    pub fn support(&self, i: u8, j: u8) -> f64 {
        self.get(i, j).unwrap_or(0.0)
    }

    pub fn joint_count(&self, i: u8, j: u8) -> u32 {
        self.joint.get(i as usize * SIDE + j as usize).copied().unwrap_or(0)
    }

    /// Meaningful pairs `(i, j, gravity)` with `i < j` at or above `min`.
    pub fn edges(&self, min: f64) -> Vec<(u8, u8, f64)> {
        let mut out = Vec::new();
        for i in 1..=MAX_NUMBER {
            for j in i + 1..=MAX_NUMBER {
                if let Some(g) = self.get(i, j) {
                    if g >= min {
                        out.push((i, j, g));
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Family {
    pub anchor: u8,
    pub satellites: Vec<u8>,
}

impl Family {
    pub fn members(&self) -> Vec<u8> {
        let mut all = vec![self.anchor];
        all.extend_from_slice(&self.satellites);
        all.sort_unstable();
        all
    }

    pub fn contains(&self, n: u8) -> bool {
        self.anchor == n || self.satellites.contains(&n)
    }

    pub fn len(&self) -> usize {
        self.satellites.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Undirected graph over 1..=90 (node index `n - 1`) with one edge per
/// pair at or above `min_gravity`, weighted by gravity.
pub fn gravity_graph(gravity: &PairGravity, min_gravity: f64) -> UnGraph<u8, f64> {
    let mut graph = UnGraph::with_capacity(MAX_NUMBER as usize, 0);
    let nodes: Vec<NodeIndex> = (1..=MAX_NUMBER).map(|n| graph.add_node(n)).collect();
    for (i, j, g) in gravity.edges(min_gravity) {
        graph.add_edge(nodes[i as usize - 1], nodes[j as usize - 1], g);
    }
    graph
}

/// Families discovered by weighted label propagation over strong pairs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FamilyMap {
    families: Vec<Family>,
    #[serde(skip)]
    membership: Vec<Option<usize>>,
}

impl FamilyMap {
    pub fn detect(gravity: &PairGravity, min_gravity: f64, max_iterations: usize) -> Self {
        let graph = gravity_graph(gravity, min_gravity);

        let mut labels: Vec<u8> = (0..SIDE as u8).collect();
        for _ in 0..max_iterations {
            let mut changed = false;
            for node in graph.node_indices() {
                let n = graph[node];
                let mut weight: BTreeMap<u8, f64> = BTreeMap::new();
                for edge in graph.edges(node) {
                    let other = if edge.source() == node { edge.target() } else { edge.source() };
                    *weight.entry(labels[graph[other] as usize]).or_insert(0.0) += *edge.weight();
                }
                if weight.is_empty() {
                    continue;
                }
                let best = weight.values().cloned().fold(f64::NEG_INFINITY, f64::max);
                let current = labels[n as usize];
                let keeps = weight.get(&current).map_or(false, |&w| w == best);
                if !keeps {
                    // BTreeMap iterates ascending, so this is the smallest tied label
                    if let Some((&label, _)) = weight.iter().find(|(_, &w)| w == best) {
                        labels[n as usize] = label;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        let degree = |node: NodeIndex| -> f64 { graph.edges(node).map(|e| *e.weight()).sum() };
        let mut groups: BTreeMap<u8, Vec<NodeIndex>> = BTreeMap::new();
        for node in graph.node_indices() {
            if graph.neighbors(node).next().is_some() {
                groups.entry(labels[graph[node] as usize]).or_default().push(node);
            }
        }

        let mut families: Vec<Family> = groups
            .into_values()
            .filter(|members| members.len() >= 2)
            .map(|members| {
                let mut anchor = members[0];
                for &m in &members[1..] {
                    if degree(m) > degree(anchor) {
                        anchor = m;
                    }
                }
                let satellites = members
                    .iter()
                    .filter(|&&m| m != anchor)
                    .map(|&m| graph[m])
                    .collect();
                Family {
                    anchor: graph[anchor],
                    satellites,
                }
            })
            .collect();
        families.sort_by_key(|f| f.members()[0]);

        let mut membership = vec![None; SIDE];
        for (idx, family) in families.iter().enumerate() {
            for m in family.members() {
                membership[m as usize] = Some(idx);
            }
        }
        Self {
            families,
            membership,
        }
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    pub fn family_of(&self, n: u8) -> Option<&Family> {
        self.membership
            .get(n as usize)
            .copied()
            .flatten()
            .and_then(|idx| self.families.get(idx))
    }

    /// Largest family, ties to the one with the smallest member.
    pub fn largest(&self) -> Option<&Family> {
        self.families
            .iter()
            .fold(None, |best: Option<&Family>, f| match best {
                Some(b) if b.len() >= f.len() => Some(b),
                _ => Some(f),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(n: &[u8]) -> NumberSet {
        NumberSet::from_slice(n)
    }

    fn history() -> Vec<NumberSet> {
        let mut draws = Vec::new();
        // {1,2,3} and {50,51} travel together, fillers rotate
        for i in 0..20u8 {
            draws.push(set(&[1, 2, 3, 10 + i, 60 + i]));
            draws.push(set(&[50, 51, 30 + i, 11 + i, 70]));
        }
        draws
    }

    #[test]
    fn test_gravity_requires_joint_support() {
        let g = PairGravity::compute(&history(), 2);
        // 1 and 2 appear together in 20 of 40 draws, each in 20
        assert!((g.get(1, 2).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(g.get(1, 2), g.get(2, 1));
        assert_eq!(g.get(1, 50), None);
        assert_eq!(g.support(1, 50), 0.0);
        assert_eq!(g.joint_count(50, 51), 20);
    }

    #[test]
    fn test_families_from_label_propagation() {
        let g = PairGravity::compute(&history(), 5);
        let map = FamilyMap::detect(&g, 1.2, 100);
        let members: Vec<Vec<u8>> = map.families().iter().map(|f| f.members()).collect();
        assert!(members.contains(&vec![1, 2, 3]));
        assert!(members.iter().any(|m| m.contains(&50) && m.contains(&51)));
        assert_eq!(map.family_of(2).map(|f| f.members()), Some(vec![1, 2, 3]));
        assert_eq!(map.family_of(89), None);
        assert_eq!(map.largest().map(|f| f.len()), Some(3));
    }

    #[test]
    fn test_graph_holds_strong_pairs_only() {
        let g = PairGravity::compute(&history(), 5);
        let graph = gravity_graph(&g, 1.2);
        assert_eq!(graph.node_count(), 90);
        let one = NodeIndex::new(0);
        let mut mates: Vec<u8> = graph.neighbors(one).map(|m| graph[m]).collect();
        mates.sort_unstable();
        assert_eq!(mates, vec![2, 3]);
        assert_eq!(graph.neighbors(NodeIndex::new(88)).count(), 0);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let g = PairGravity::compute(&history(), 2);
        let a = FamilyMap::detect(&g, 1.2, 100);
        let b = FamilyMap::detect(&g, 1.2, 100);
        assert_eq!(a.families(), b.families());
    }
}
