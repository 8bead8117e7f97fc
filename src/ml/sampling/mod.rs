pub mod oversample;

pub use oversample::Oversampler;
