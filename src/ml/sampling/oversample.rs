use crate::config::Oversampling;
use crate::ml::features::FEATURE_COUNT;
use crate::ml::labeling::LabeledDataset;
use rand::Rng;

/// Minority-class oversampling, resolved once from configuration.
pub struct Oversampler {
    method: Oversampling,
    neighbors: usize,
}

impl Oversampler {
    pub fn new(method: Oversampling, neighbors: usize) -> Self {
        Self {
            method,
            neighbors: neighbors.max(1),
        }
    }

    pub fn method(&self) -> Oversampling {
        self.method
    }

    /// Append synthetic positives until both classes have the same size.
    pub fn balance<R: Rng>(&self, data: &LabeledDataset, rng: &mut R) -> LabeledDataset {
        let minority: Vec<usize> = (0..data.len()).filter(|&i| data.labels[i] == 1).collect();
        let majority = data.len() - minority.len();
        let mut out = data.clone();

        if minority.is_empty() || minority.len() >= majority {
            return out;
        }
        let needed = majority - minority.len();

        match self.method {
            Oversampling::Smote if minority.len() >= 2 => {
                self.smote(data, &minority, needed, rng, &mut out)
            }
            _ => random_duplicates(data, &minority, needed, rng, &mut out),
        }

        log::debug!(
            "{:?} oversampling added {} rows ({} -> {})",
            self.method,
            needed,
            data.len(),
            out.len()
        );
        out
    }

    fn smote<R: Rng>(
        &self,
        data: &LabeledDataset,
        minority: &[usize],
        needed: usize,
        rng: &mut R,
        out: &mut LabeledDataset,
    ) {
        let k = self.neighbors.min(minority.len() - 1);
        let neighbors: Vec<Vec<usize>> = minority
            .iter()
            .map(|&i| nearest(data, minority, i, k))
            .collect();

        for _ in 0..needed {
            let pick = rng.gen_range(0..minority.len());
            let base = &data.rows[minority[pick]];
            let other = &data.rows[neighbors[pick][rng.gen_range(0..k)]];
            let gap: f64 = rng.gen();
            let mut row = [0.0; FEATURE_COUNT];
            for f in 0..FEATURE_COUNT {
                row[f] = base[f] + gap * (other[f] - base[f]);
            }
            out.push(row, 1);
        }
    }
}

fn random_duplicates<R: Rng>(
    data: &LabeledDataset,
    minority: &[usize],
    needed: usize,
    rng: &mut R,
    out: &mut LabeledDataset,
) {
    for _ in 0..needed {
        let idx = minority[rng.gen_range(0..minority.len())];
        out.push(data.rows[idx], 1);
    }
}

/// `k` nearest minority rows to `row` (squared euclidean, ties by index).
fn nearest(data: &LabeledDataset, minority: &[usize], row: usize, k: usize) -> Vec<usize> {
    let origin = &data.rows[row];
    let mut dists: Vec<(f64, usize)> = minority
        .iter()
        .filter(|&&j| j != row)
        .map(|&j| {
            let d = origin
                .iter()
                .zip(&data.rows[j])
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
            (d, j)
        })
        .collect();
    dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    dists.into_iter().take(k).map(|(_, j)| j).collect()
}
