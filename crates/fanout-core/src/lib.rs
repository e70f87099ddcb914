//! Core types for the fanout parallel transform/reduce engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the index partitioner shared by every engine operation, the error
//! taxonomy returned to callers, and fallible buffer allocation helpers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod error;
pub mod partition;

pub use alloc::{try_buffer, try_vec_with_capacity};
pub use error::{EngineError, PartitionError, TransformError};
pub use partition::{partition, Partition, Partitions};
