pub mod primitives;
pub mod ranking;

pub use ranking::{frequency_counts, frequency_ranked, rank_by_score};
