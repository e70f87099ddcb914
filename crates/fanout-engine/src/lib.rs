//! Parallel transform/reduce engine.
//!
//! Provides the [`Engine`] that applies user functions across a buffer on
//! a bounded set of worker threads: element-wise map (allocating and
//! in-place), tabulate over an index range, and a divide-and-conquer
//! reduce whose split structure is independent of the worker count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod dispatch;
mod engine;
mod map;
mod reduce;
mod tabulate;

pub use config::{ConfigError, EngineConfig, DEFAULT_REDUCE_CUTOFF, MAX_WORKERS, MIN_STACK_SIZE};
pub use engine::{map, map_fast, reduce, tabulate, Engine};
pub use fanout_core::{EngineError, Partition, TransformError};
