pub mod registry;
pub mod thread;
pub mod types;

pub use registry::{ThreadRegistry, DEFAULT_THREAD};
pub use thread::ThreadMemory;
pub use types::Turn;
