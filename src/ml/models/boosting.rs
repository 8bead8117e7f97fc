use super::ProbabilityModel;
use crate::config::BoostingConfig;
use crate::error::{OracleError, Result};
use crate::utils::Deadline;

const EPS: f64 = 1e-6;
const MAX_LEAF: f64 = 4.0;

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        bin: u8,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn eval(&self, bins: &[u8]) -> f64 {
        match self {
            Node::Leaf(v) => *v,
            Node::Split {
                feature,
                bin,
                left,
                right,
            } => {
                if bins[*feature] <= *bin {
                    left.eval(bins)
                } else {
                    right.eval(bins)
                }
            }
        }
    }
}

/// Quantile cut points per feature.
#[derive(Debug, Clone)]
struct Binner {
    cuts: Vec<Vec<f64>>,
}

impl Binner {
    fn fit(x: &[Vec<f64>], bins: usize) -> Self {
        let features = x.first().map(|r| r.len()).unwrap_or(0);
        let cuts = (0..features)
            .map(|f| {
                let mut values: Vec<f64> = x.iter().map(|r| r[f]).collect();
                values.sort_by(|a, b| a.total_cmp(b));
                values.dedup();
                if values.len() <= bins {
                    // midpoints between distinct values
                    values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
                } else {
                    let mut cuts: Vec<f64> = (1..bins)
                        .map(|q| values[q * values.len() / bins])
                        .collect();
                    cuts.dedup();
                    cuts
                }
            })
            .collect();
        Self { cuts }
    }

    fn transform_row(&self, row: &[f64]) -> Vec<u8> {
        self.cuts
            .iter()
            .zip(row)
            .map(|(cuts, v)| cuts.partition_point(|c| c < v).min(u8::MAX as usize) as u8)
            .collect()
    }

    fn bin_count(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }
}

/// Boosting learner: gradient-boosted regression trees with logistic loss
/// and histogram split search.
#[derive(Debug, Clone)]
pub struct BoostedTrees {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<Node>,
    binner: Binner,
}

struct TreeBuilder<'a> {
    bins: &'a [Vec<u8>],
    binner: &'a Binner,
    gradients: &'a [f64],
    hessians: &'a [f64],
    max_depth: usize,
    min_leaf: usize,
}

impl BoostedTrees {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u8],
        config: &BoostingConfig,
        deadline: &Deadline,
    ) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(OracleError::Model(format!(
                "boosting needs matching non-empty inputs, got {} rows and {} labels",
                x.len(),
                y.len()
            )));
        }

        let binner = Binner::fit(x, config.bins);
        let bins: Vec<Vec<u8>> = x.iter().map(|r| binner.transform_row(r)).collect();

        let positive_rate = (y.iter().map(|&l| l as f64).sum::<f64>() / y.len() as f64)
            .clamp(EPS, 1.0 - EPS);
        let base_score = (positive_rate / (1.0 - positive_rate)).ln();

        let mut raw = vec![base_score; x.len()];
        let mut trees = Vec::with_capacity(config.rounds);

        for _ in 0..config.rounds {
            deadline.check()?;

            let mut gradients = Vec::with_capacity(x.len());
            let mut hessians = Vec::with_capacity(x.len());
            for (r, &label) in raw.iter().zip(y) {
                let p = sigmoid(*r);
                gradients.push(label as f64 - p);
                hessians.push((p * (1.0 - p)).max(EPS));
            }

            let builder = TreeBuilder {
                bins: &bins,
                binner: &binner,
                gradients: &gradients,
                hessians: &hessians,
                max_depth: config.max_depth,
                min_leaf: config.min_samples_leaf.max(1),
            };
            let indices: Vec<usize> = (0..x.len()).collect();
            let tree = builder.build(&indices, 0);

            for (i, r) in raw.iter_mut().enumerate() {
                *r += config.learning_rate * tree.eval(&bins[i]);
            }
            trees.push(tree);
        }

        Ok(Self {
            base_score,
            learning_rate: config.learning_rate,
            trees,
            binner,
        })
    }

    pub fn rounds(&self) -> usize {
        self.trees.len()
    }

    fn raw_score(&self, row: &[f64]) -> f64 {
        let bins = self.binner.transform_row(row);
        self.base_score
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.eval(&bins))
                .sum::<f64>()
    }
}

impl ProbabilityModel for BoostedTrees {
    fn name(&self) -> &'static str {
        "boosting"
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(x.iter().map(|row| sigmoid(self.raw_score(row))).collect())
    }
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize) -> Node {
        let leaf = self.leaf_value(indices);
        if depth >= self.max_depth || indices.len() < 2 * self.min_leaf {
            return Node::Leaf(leaf);
        }

        match self.best_split(indices) {
            Some((feature, bin)) => {
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| self.bins[i][feature] <= bin);
                Node::Split {
                    feature,
                    bin,
                    left: Box::new(self.build(&left, depth + 1)),
                    right: Box::new(self.build(&right, depth + 1)),
                }
            }
            None => Node::Leaf(leaf),
        }
    }

    /// Newton step `sum(g) / sum(h)`, clamped.
    fn leaf_value(&self, indices: &[usize]) -> f64 {
        let g: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let h: f64 = indices.iter().map(|&i| self.hessians[i]).sum();
        (g / (h + EPS)).clamp(-MAX_LEAF, MAX_LEAF)
    }

    fn best_split(&self, indices: &[usize]) -> Option<(usize, u8)> {
        let total_g: f64 = indices.iter().map(|&i| self.gradients[i]).sum();
        let total_h: f64 = indices.iter().map(|&i| self.hessians[i]).sum();
        let parent = total_g * total_g / (total_h + EPS);

        let mut best: Option<(f64, usize, u8)> = None;
        for feature in 0..self.binner.cuts.len() {
            let n_bins = self.binner.bin_count(feature);
            if n_bins < 2 {
                continue;
            }
            let mut g_hist = vec![0.0; n_bins];
            let mut h_hist = vec![0.0; n_bins];
            let mut c_hist = vec![0usize; n_bins];
            for &i in indices {
                let b = self.bins[i][feature] as usize;
                g_hist[b] += self.gradients[i];
                h_hist[b] += self.hessians[i];
                c_hist[b] += 1;
            }

            let (mut gl, mut hl, mut cl) = (0.0, 0.0, 0usize);
            for b in 0..n_bins - 1 {
                gl += g_hist[b];
                hl += h_hist[b];
                cl += c_hist[b];
                let cr = indices.len() - cl;
                if cl < self.min_leaf || cr < self.min_leaf {
                    continue;
                }
                let gr = total_g - gl;
                let hr = total_h - hl;
                let gain = gl * gl / (hl + EPS) + gr * gr / (hr + EPS) - parent;
                if gain > 1e-9 && best.map_or(true, |(g, _, _)| gain > g) {
                    best = Some((gain, feature, b as u8));
                }
            }
        }
        best.map(|(_, f, b)| (f, b))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BoostingConfig {
        BoostingConfig {
            rounds: 20,
            max_depth: 2,
            learning_rate: 0.3,
            bins: 16,
            min_samples_leaf: 2,
        }
    }

    #[test]
    fn test_learns_threshold() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..60 {
            x.push(vec![i as f64, (i % 7) as f64]);
            y.push(u8::from(i >= 30));
        }
        let model = BoostedTrees::fit(&x, &y, &config(), &Deadline::unbounded()).unwrap();
        assert_eq!(model.rounds(), 20);
        let p = model.predict_proba(&[vec![5.0, 3.0], vec![55.0, 3.0]]).unwrap();
        assert!(p[0] < 0.3, "low side {}", p[0]);
        assert!(p[1] > 0.7, "high side {}", p[1]);
    }

    #[test]
    fn test_constant_labels_give_base_rate() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y = vec![0u8; 10];
        let model = BoostedTrees::fit(&x, &y, &config(), &Deadline::unbounded()).unwrap();
        let p = model.predict_proba(&[vec![3.0]]).unwrap();
        assert!(p[0] < 0.01);
    }

    #[test]
    fn test_respects_deadline() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<u8> = (0..10).map(|i| u8::from(i > 4)).collect();
        let deadline = Deadline::new(Some(std::time::Duration::ZERO));
        assert!(BoostedTrees::fit(&x, &y, &config(), &deadline).is_err());
    }
}
