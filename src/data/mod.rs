pub mod cache;
pub mod validator;
pub mod window;

pub use cache::ModelCache;
pub use validator::DrawValidator;
pub use window::{DrawWindow, MachineWindow};
