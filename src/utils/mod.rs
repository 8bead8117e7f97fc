pub mod deadline;

pub use deadline::Deadline;
