use crate::ml::features::FEATURE_COUNT;

/// Z-score standardisation fitted on the training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: [f64; FEATURE_COUNT],
    stds: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        let mut means = [0.0; FEATURE_COUNT];
        let mut stds = [1.0; FEATURE_COUNT];
        if rows.is_empty() {
            return Self { means, stds };
        }
        let n = rows.len() as f64;
        for f in 0..FEATURE_COUNT {
            let mean = rows.iter().map(|r| r[f]).sum::<f64>() / n;
            let var = rows.iter().map(|r| (r[f] - mean).powi(2)).sum::<f64>() / n;
            means[f] = mean;
            // constant columns pass through centred
            stds[f] = if var > 1e-12 { var.sqrt() } else { 1.0 };
        }
        Self { means, stds }
    }

    pub fn transform_row(&self, row: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        (0..FEATURE_COUNT)
            .map(|f| (row[f] - self.means[f]) / self.stds[f])
            .collect()
    }

    pub fn transform(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardises_columns() {
        let rows = vec![[1.0; FEATURE_COUNT], [3.0; FEATURE_COUNT]];
        let scaler = StandardScaler::fit(&rows);
        let out = scaler.transform(&rows);
        assert_eq!(out[0][0], -1.0);
        assert_eq!(out[1][0], 1.0);
    }

    #[test]
    fn test_constant_column_is_centred() {
        let rows = vec![[2.0; FEATURE_COUNT], [2.0; FEATURE_COUNT]];
        let out = StandardScaler::fit(&rows).transform(&rows);
        assert_eq!(out[0][3], 0.0);
    }
}
