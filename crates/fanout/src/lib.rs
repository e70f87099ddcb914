//! Fanout: generic parallel map, tabulate, and reduce over worker threads.
//!
//! This is the facade crate re-exporting the public API of the fanout
//! sub-crates. For most users, adding `fanout` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fanout::prelude::*;
//!
//! let engine = Engine::new(EngineConfig::with_workers(4)).unwrap();
//!
//! let input: Vec<i32> = (0..10).collect();
//! let mut squares = vec![0; input.len()];
//! engine.map(&input, &mut squares, |x| x * x).unwrap();
//! assert_eq!(squares, [0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
//!
//! let mut doubled = vec![0; input.len()];
//! engine.map_fast(&input, &mut doubled, |x, out| *out = x * 2).unwrap();
//! assert_eq!(doubled[9], 18);
//!
//! let table = engine.tabulate(5, |i| i as f64 / 2.0).unwrap();
//! assert_eq!(table, [0.0, 0.5, 1.0, 1.5, 2.0]);
//!
//! let sum = engine.reduce(&input, |a, b| a + b).unwrap();
//! assert_eq!(sum, 45);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fanout-core` | Partitioning, error types, allocation helpers |
//! | [`engine`] | `fanout-engine` | The [`Engine`](engine::Engine), its config, one-shot functions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Partitioning, errors, and allocation helpers (`fanout-core`).
pub use fanout_core as types;

/// The parallel engine and its configuration (`fanout-engine`).
///
/// [`engine::Engine`] carries a validated [`engine::EngineConfig`];
/// [`engine::map`], [`engine::map_fast`], [`engine::tabulate`], and
/// [`engine::reduce`] run on a default engine.
pub use fanout_engine as engine;

/// Common imports for typical fanout usage.
///
/// ```rust
/// use fanout::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use fanout_engine::{ConfigError, Engine, EngineConfig};

    // One-shot operations
    pub use fanout_engine::{map, map_fast, reduce, tabulate};

    // Errors
    pub use fanout_core::{EngineError, PartitionError, TransformError};

    // Partitioning
    pub use fanout_core::{partition, Partition};
}
