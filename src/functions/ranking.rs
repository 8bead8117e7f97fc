use crate::types::{NumberSet, MAX_NUMBER};
use std::cmp::Ordering;

/// Appearances per number across `draws`, indexed by number (index 0 unused).
pub fn frequency_counts(draws: &[NumberSet]) -> [u32; 91] {
    let mut counts = [0u32; 91];
    for draw in draws {
        for n in draw.iter() {
            counts[n as usize] += 1;
        }
    }
    counts
}

/// Every number 1..=90 outside `exclude`, by count desc then number asc.
///
/// This is the shared last-resort tier: whenever a strategy cannot produce
/// five numbers on its own it pads from this ranking.
pub fn frequency_ranked(counts: &[u32; 91], exclude: &NumberSet) -> Vec<u8> {
    let mut numbers: Vec<u8> = (1..=MAX_NUMBER).filter(|&n| !exclude.contains(n)).collect();
    numbers.sort_by(|&a, &b| counts[b as usize].cmp(&counts[a as usize]).then(a.cmp(&b)));
    numbers
}

/// Pad `selected` up to `target` numbers from the frequency ranking.
pub fn pad_by_frequency(selected: &mut Vec<u8>, target: usize, counts: &[u32; 91]) {
    let taken = NumberSet::from_slice(selected);
    for n in frequency_ranked(counts, &taken) {
        if selected.len() >= target {
            break;
        }
        selected.push(n);
    }
}

/// Numbers ordered by score desc, ties by number asc.
pub fn rank_by_score(scores: &[(u8, f64)]) -> Vec<u8> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| compare_scores(a, b));
    ranked.into_iter().map(|(n, _)| n).collect()
}

pub fn compare_scores(a: &(u8, f64), b: &(u8, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_ranked_breaks_ties_by_number() {
        let draws = vec![
            NumberSet::from_slice(&[10, 20, 30, 40, 50]),
            NumberSet::from_slice(&[10, 21, 31, 41, 51]),
        ];
        let counts = frequency_counts(&draws);
        let ranked = frequency_ranked(&counts, &NumberSet::default());
        assert_eq!(ranked[0], 10);
        assert_eq!(&ranked[1..4], &[20, 21, 30]);
        assert_eq!(ranked.len(), 90);
    }

    #[test]
    fn test_pad_by_frequency_skips_taken() {
        let draws = vec![NumberSet::from_slice(&[5, 6, 7, 8, 9])];
        let counts = frequency_counts(&draws);
        let mut selected = vec![6, 80];
        pad_by_frequency(&mut selected, 5, &counts);
        assert_eq!(selected, vec![6, 80, 5, 7, 8]);
    }

    #[test]
    fn test_rank_by_score() {
        let ranked = rank_by_score(&[(3, 1.0), (1, 2.0), (2, 1.0)]);
        assert_eq!(ranked, vec![1, 2, 3]);
    }
}
