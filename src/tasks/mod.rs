//! Background Tasks
//!
//! Periodic maintenance running alongside the cache.

mod sweep;

pub use sweep::spawn_sweep_task;
