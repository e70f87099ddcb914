//! Error types for the fanout engine.
//!
//! Organized by layer: partitioning, user transforms, and engine
//! dispatch. Every engine operation returns [`EngineError`]; nothing in
//! the library terminates the process.

use std::error::Error;
use std::fmt;

/// Errors from [`partition()`](crate::partition::partition).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionError {
    /// A partition was requested for zero workers.
    ZeroWorkers,
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWorkers => write!(f, "cannot partition across zero workers"),
        }
    }
}

impl Error for PartitionError {}

/// Errors raised by a fallible transform or combine function.
///
/// Returned from the closures passed to `try_map`, `try_tabulate` and
/// `try_reduce`, and wrapped in [`EngineError::Transform`] by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformError {
    /// The transform could not allocate its result.
    AllocationFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
    },
    /// The transform failed for a reason of its own.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { bytes } => {
                write!(f, "allocation of {bytes} bytes failed")
            }
            Self::Failed { reason } => write!(f, "transform failed: {reason}"),
        }
    }
}

impl Error for TransformError {}

/// Errors returned by engine operations (`map`, `map_fast`, `tabulate`,
/// `reduce` and their fallible variants).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The output buffer does not have one slot per input element.
    LengthMismatch {
        /// Number of input elements.
        input: usize,
        /// Number of output slots supplied.
        output: usize,
    },
    /// `reduce` was called on an empty sequence.
    EmptyInput,
    /// The engine could not allocate a buffer it needed.
    AllocationFailed {
        /// Number of elements requested.
        elements: usize,
    },
    /// A transform or combine function failed.
    ///
    /// When several workers fail, the lowest element index is reported.
    Transform {
        /// Index of the element (or, for reduce, the first element of the
        /// subrange) whose evaluation failed.
        index: usize,
        /// The underlying transform error.
        source: TransformError,
    },
    /// A worker thread could not be spawned. Workers spawned before the
    /// failure were joined before this error was returned.
    ThreadSpawnFailed {
        /// Index of the worker that failed to start.
        worker: usize,
        /// OS-level description of the failure.
        reason: String,
    },
    /// A worker thread panicked while running user code.
    WorkerPanicked {
        /// Index of the worker that panicked.
        worker: usize,
    },
    /// Partitioning the index space failed.
    Partition(PartitionError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { input, output } => {
                write!(
                    f,
                    "output buffer has {output} slots but input has {input} elements"
                )
            }
            Self::EmptyInput => write!(f, "cannot reduce an empty sequence"),
            Self::AllocationFailed { elements } => {
                write!(f, "failed to allocate buffer of {elements} elements")
            }
            Self::Transform { index, source } => {
                write!(f, "element {index}: {source}")
            }
            Self::ThreadSpawnFailed { worker, reason } => {
                write!(f, "failed to spawn worker {worker}: {reason}")
            }
            Self::WorkerPanicked { worker } => write!(f, "worker {worker} panicked"),
            Self::Partition(e) => write!(f, "partition: {e}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transform { source, .. } => Some(source),
            Self::Partition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PartitionError> for EngineError {
    fn from(e: PartitionError) -> Self {
        Self::Partition(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_error_display() {
        let err = TransformError::AllocationFailed { bytes: 64 };
        assert_eq!(format!("{err}"), "allocation of 64 bytes failed");
        let err = TransformError::Failed {
            reason: "negative input".into(),
        };
        assert_eq!(format!("{err}"), "transform failed: negative input");
    }

    #[test]
    fn engine_error_wraps_transform_source() {
        let err = EngineError::Transform {
            index: 7,
            source: TransformError::AllocationFailed { bytes: 4 },
        };
        let msg = format!("{err}");
        assert!(msg.contains("element 7"));
        assert!(msg.contains("4 bytes"));
        assert!(err.source().is_some());
    }

    #[test]
    fn thread_spawn_failed_display() {
        let err = EngineError::ThreadSpawnFailed {
            worker: 3,
            reason: "resource temporarily unavailable".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("worker 3"));
        assert!(msg.contains("resource temporarily unavailable"));
        assert!(err.source().is_none());
    }

    #[test]
    fn partition_error_converts() {
        let err: EngineError = PartitionError::ZeroWorkers.into();
        assert_eq!(err, EngineError::Partition(PartitionError::ZeroWorkers));
        assert!(format!("{err}").contains("zero workers"));
    }

    #[test]
    fn length_mismatch_display() {
        let err = EngineError::LengthMismatch {
            input: 10,
            output: 9,
        };
        assert_eq!(
            format!("{err}"),
            "output buffer has 9 slots but input has 10 elements"
        );
    }
}
