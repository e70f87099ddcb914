//! Fallible buffer allocation.
//!
//! Rust aborts on allocation failure by default. These helpers reserve
//! through [`Vec::try_reserve_exact`] so that an out-of-memory condition
//! surfaces as a recoverable error instead.

use std::mem;

use crate::error::{EngineError, TransformError};

/// Allocate an empty `Vec<T>` with room for exactly `capacity` elements.
///
/// Intended for use inside fallible transforms and combines: a failed
/// reservation becomes [`TransformError::AllocationFailed`], which the
/// engine reports with the index of the element being processed.
pub fn try_vec_with_capacity<T>(capacity: usize) -> Result<Vec<T>, TransformError> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| TransformError::AllocationFailed {
            bytes: capacity.saturating_mul(mem::size_of::<T>()),
        })?;
    Ok(v)
}

/// Engine-side variant of [`try_vec_with_capacity`].
///
/// Used for buffers the engine itself owns (tabulate's index buffer and
/// per-worker output chunks).
pub fn try_buffer<T>(capacity: usize) -> Result<Vec<T>, EngineError> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| EngineError::AllocationFailed { elements: capacity })?;
    Ok(v)
}
