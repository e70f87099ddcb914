//! Thread partitioner and fork/join dispatcher for the map engines.
//!
//! The dispatcher splits `[0, n)` with [`partition`], spawns one scoped
//! worker per non-empty partition, and blocks on a join barrier until
//! every worker has returned. Workers only ever see their own disjoint
//! input and output sub-slices, so no locking is needed.
//!
//! With a single task the work runs on the calling thread. Thread-spawn
//! failures and worker panics are reported as [`EngineError`] values
//! after all spawned workers have been joined.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use fanout_core::{partition, try_buffer, EngineError, Partition};
use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::config::EngineConfig;

/// Inline capacity for per-dispatch task and result lists.
pub(crate) const INLINE_WORKERS: usize = 16;

type Tasks<T> = SmallVec<[(Partition, T); INLINE_WORKERS]>;

/// Run `body` on the current thread, converting a panic into
/// [`EngineError::WorkerPanicked`].
pub(crate) fn run_guarded<R>(
    worker: usize,
    body: impl FnOnce() -> Result<R, EngineError>,
) -> Result<R, EngineError> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(_) => {
            warn!(worker, "task panicked");
            Err(EngineError::WorkerPanicked { worker })
        }
    }
}

/// Fork/join dispatcher bound to an engine configuration.
pub(crate) struct Dispatcher<'e> {
    config: &'e EngineConfig,
}

impl<'e> Dispatcher<'e> {
    pub(crate) fn new(config: &'e EngineConfig) -> Self {
        Self { config }
    }

    /// Apply `body` to aligned chunks of `input` and `output`, one chunk
    /// per partition of `[0, input.len())` across `workers`.
    ///
    /// `input` and `output` must have the same length.
    pub(crate) fn scatter<I, O, B>(
        &self,
        input: &[I],
        output: &mut [O],
        workers: usize,
        body: B,
    ) -> Result<(), EngineError>
    where
        I: Sync,
        O: Send,
        B: Fn(Partition, &[I], &mut [O]) -> Result<(), EngineError> + Sync,
    {
        debug_assert_eq!(input.len(), output.len());
        let mut tasks: Tasks<(&[I], &mut [O])> = SmallVec::new();
        let mut rest = output;
        for part in partition(input.len(), workers)? {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(part.len);
            rest = tail;
            if part.is_empty() {
                continue;
            }
            tasks.push((part, (&input[part.range()], chunk)));
        }
        self.fork_join(input.len(), tasks, |part, (inp, out)| body(part, inp, out))?;
        Ok(())
    }

    /// Build a new `n`-element buffer: each worker produces the elements of
    /// its partition and the chunks are concatenated in partition order.
    pub(crate) fn gather<O, B>(&self, n: usize, workers: usize, body: B) -> Result<Vec<O>, EngineError>
    where
        O: Send,
        B: Fn(Partition) -> Result<Vec<O>, EngineError> + Sync,
    {
        let tasks: Tasks<()> = partition(n, workers)?
            .filter(|p| !p.is_empty())
            .map(|p| (p, ()))
            .collect();
        let chunks = self.fork_join(n, tasks, |part, ()| body(part))?;
        let mut out = try_buffer(n)?;
        for chunk in chunks {
            out.extend(chunk);
        }
        Ok(out)
    }

    /// Spawn one worker per task, then join all of them.
    ///
    /// Results come back in task order. On failure, the error from the
    /// earliest task wins, except that a spawn failure takes precedence.
    fn fork_join<T, R, B>(
        &self,
        n: usize,
        tasks: Tasks<T>,
        body: B,
    ) -> Result<SmallVec<[R; INLINE_WORKERS]>, EngineError>
    where
        T: Send,
        R: Send,
        B: Fn(Partition, T) -> Result<R, EngineError> + Sync,
    {
        debug!(elements = n, workers = tasks.len(), "dispatching");
        let mut results = SmallVec::new();
        if tasks.len() <= 1 {
            for (part, payload) in tasks {
                results.push(run_guarded(0, || body(part, payload))?);
            }
            return Ok(results);
        }

        let body = &body;
        thread::scope(|scope| {
            let mut handles = SmallVec::<[_; INLINE_WORKERS]>::new();
            let mut spawn_error = None;
            for (worker, (part, payload)) in tasks.into_iter().enumerate() {
                let spawned = self.config.thread_builder(worker).spawn_scoped(scope, move || {
                    trace!(worker, offset = part.offset, len = part.len, "worker started");
                    body(part, payload)
                });
                match spawned {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(e) => {
                        error!(worker, error = %e, "failed to spawn worker");
                        spawn_error = Some(EngineError::ThreadSpawnFailed {
                            worker,
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }

            // Join barrier: every spawned worker is joined before returning.
            let mut first_error = None;
            for (worker, handle) in handles {
                match handle.join() {
                    Ok(Ok(r)) => results.push(r),
                    Ok(Err(e)) => {
                        first_error.get_or_insert(e);
                    }
                    Err(_) => {
                        warn!(worker, "worker panicked");
                        first_error.get_or_insert(EngineError::WorkerPanicked { worker });
                    }
                }
            }

            match spawn_error.or(first_error) {
                Some(e) => Err(e),
                None => Ok(results),
            }
        })
    }
}
