//! Counter queue engine
//!
//! This module owns the fixed set of service counters, the least-loaded
//! selection rule used to place new users, and the status and rotation
//! operations applied to each counter's queue.

pub mod counter;
pub mod engine;
pub mod selection;

// Re-export commonly used types
pub use counter::CounterQueue;
pub use engine::{CounterQueueEngine, EngineStats};
pub use selection::{CounterSelector, LeastLoadedSelector};
