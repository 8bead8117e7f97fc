pub mod window;

pub use window::{LabeledDataset, SlidingWindowLabeler};
