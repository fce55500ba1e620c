//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod memory;
pub mod traits;

pub use deps::ServerDeps;
pub use memory::MemoryStore;
pub use traits::*;
