//! Tabulate: build a buffer from an index range.
//!
//! `tabulate(n, f)` is defined as the allocating map of `f` over the index
//! buffer `[0, 1, ..., n - 1]`. The index buffer itself is built in
//! parallel, each worker filling its own partition.

use fanout_core::{try_buffer, EngineError, TransformError};

use crate::engine::Engine;

impl Engine {
    /// Build `vec![f(0), f(1), ..., f(n - 1)]` in parallel.
    ///
    /// `n == 0` yields an empty vector.
    pub fn tabulate<O, F>(&self, n: usize, f: F) -> Result<Vec<O>, EngineError>
    where
        O: Send,
        F: Fn(usize) -> O + Sync,
    {
        self.try_tabulate(n, |i| Ok(f(i)))
    }

    /// Fallible form of [`tabulate`](Engine::tabulate).
    ///
    /// A failure at index `i` is reported as
    /// [`EngineError::Transform`] with `index == i`.
    pub fn try_tabulate<O, F>(&self, n: usize, f: F) -> Result<Vec<O>, EngineError>
    where
        O: Send,
        F: Fn(usize) -> Result<O, TransformError> + Sync,
    {
        let indices = self.index_buffer(n)?;
        self.try_map_collect(&indices, |i| f(*i))
    }

    /// `[0, 1, ..., n - 1]`, filled in parallel.
    fn index_buffer(&self, n: usize) -> Result<Vec<usize>, EngineError> {
        let workers = self.config.workers_for(n);
        self.dispatcher().gather(n, workers, |part| {
            let mut chunk = try_buffer(part.len)?;
            chunk.extend(part.range());
            Ok(chunk)
        })
    }
}
