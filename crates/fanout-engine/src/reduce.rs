//! Divide-and-conquer reduce with bounded concurrency.
//!
//! The fold tree is fixed by the element count alone: a range of `n > 1`
//! elements splits at `mid = n / 2` into `[0, mid)` and `[mid, n)`, and the
//! two halves are combined as `combine(left, right)`. Execution never
//! changes that shape:
//!
//! 1. The tree is cut at `reduce_cutoff`: every subrange of at most
//!    `reduce_cutoff` elements becomes a leaf task.
//! 2. Leaf tasks go onto a crossbeam channel drained by at most
//!    `worker_count` pool threads. Each leaf is folded sequentially with
//!    the same split rule.
//! 3. The calling thread combines leaf results bottom-up along the upper
//!    tree.
//!
//! The result is therefore identical for every worker count and every
//! cutoff, even when `combine` is not associative, and no call spawns more
//! than `worker_count` threads.
//!
//! Failures follow the same order. Every leaf reports either a value or an
//! error (a panic inside a leaf is caught and reported as
//! [`EngineError::WorkerPanicked`] naming the thread that ran it), the
//! lowest failing leaf wins, and the upper tree is only folded once all
//! leaves succeeded.

use std::borrow::Cow;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use fanout_core::{try_buffer, EngineError, Partition, TransformError};
use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::dispatch::{run_guarded, INLINE_WORKERS};
use crate::engine::Engine;

type LeafResult<T> = (usize, Result<T, EngineError>);

/// Cut the fold tree over `[offset, offset + len)` at `cutoff`, appending
/// leaves left to right.
fn plan_leaves(offset: usize, len: usize, cutoff: usize, leaves: &mut Vec<Partition>) {
    if len <= cutoff || len <= 1 {
        leaves.push(Partition { offset, len });
        return;
    }
    let mid = len / 2;
    plan_leaves(offset, mid, cutoff, leaves);
    plan_leaves(offset + mid, len - mid, cutoff, leaves);
}

/// Sequential fold of `input` (which starts at global index `offset`).
fn fold_range<T, C>(input: &[T], offset: usize, combine: &C) -> Result<T, EngineError>
where
    T: Clone,
    C: Fn(&T, &T) -> Result<T, TransformError>,
{
    match input.len() {
        0 => Err(EngineError::EmptyInput),
        1 => Ok(input[0].clone()),
        n => {
            let mid = n / 2;
            let (l, r) = input.split_at(mid);
            let left = fold_range(l, offset, combine)?;
            let right = fold_range(r, offset + mid, combine)?;
            combine(&left, &right).map_err(|source| EngineError::Transform {
                index: offset,
                source,
            })
        }
    }
}

/// Combine leaf results along the upper part of the fold tree.
///
/// Walks the same recursion as [`plan_leaves`], so `partials[next]` is
/// always the result for the leaf being visited.
fn fold_upper<'p, T, C>(
    offset: usize,
    len: usize,
    cutoff: usize,
    partials: &'p [T],
    next: &mut usize,
    combine: &C,
) -> Result<Cow<'p, T>, EngineError>
where
    T: Clone,
    C: Fn(&T, &T) -> Result<T, TransformError>,
{
    if len <= cutoff || len <= 1 {
        let leaf = &partials[*next];
        *next += 1;
        return Ok(Cow::Borrowed(leaf));
    }
    let mid = len / 2;
    let left = fold_upper(offset, mid, cutoff, partials, next, combine)?;
    let right = fold_upper(offset + mid, len - mid, cutoff, partials, next, combine)?;
    combine(&*left, &*right)
        .map(Cow::Owned)
        .map_err(|source| EngineError::Transform {
            index: offset,
            source,
        })
}

/// Pool worker: fold leaves until the task queue is drained.
fn leaf_worker<T, C>(
    worker: usize,
    input: &[T],
    combine: &C,
    tasks: Receiver<(usize, Partition)>,
    replies: Sender<LeafResult<T>>,
) where
    T: Clone,
    C: Fn(&T, &T) -> Result<T, TransformError>,
{
    while let Ok((leaf, part)) = tasks.recv() {
        trace!(worker, leaf, offset = part.offset, len = part.len, "folding leaf");
        let result = run_guarded(worker, || {
            fold_range(&input[part.range()], part.offset, combine)
        });
        // The receiver outlives the pool; a closed channel means the
        // caller has stopped listening.
        if replies.send((leaf, result)).is_err() {
            break;
        }
    }
}

/// Fold each leaf on the calling thread, in leaf order, stopping at the
/// first failure.
fn fold_leaves_inline<T, C>(
    input: &[T],
    leaves: &[Partition],
    combine: &C,
) -> Result<Vec<T>, EngineError>
where
    T: Clone,
    C: Fn(&T, &T) -> Result<T, TransformError>,
{
    let mut partials = try_buffer(leaves.len())?;
    for part in leaves {
        partials.push(fold_range(&input[part.range()], part.offset, combine)?);
    }
    Ok(partials)
}

impl Engine {
    /// Fold `input` with `combine` into a single value.
    ///
    /// `combine` should be associative; the grouping is the fixed binary
    /// split described in the module docs, not a left fold. A single
    /// element is returned as a clone.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptyInput`] if `input` is empty.
    pub fn reduce<T, C>(&self, input: &[T], combine: C) -> Result<T, EngineError>
    where
        T: Clone + Send + Sync,
        C: Fn(&T, &T) -> T + Sync,
    {
        self.try_reduce(input, |a, b| Ok(combine(a, b)))
    }

    /// Fallible form of [`reduce`](Engine::reduce).
    ///
    /// A failing combine is reported as [`EngineError::Transform`] with
    /// `index` set to the first element of the subrange being combined.
    pub fn try_reduce<T, C>(&self, input: &[T], combine: C) -> Result<T, EngineError>
    where
        T: Clone + Send + Sync,
        C: Fn(&T, &T) -> Result<T, TransformError> + Sync,
    {
        if input.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        let cutoff = self.config.reduce_cutoff;
        let mut leaves = Vec::new();
        plan_leaves(0, input.len(), cutoff, &mut leaves);
        let workers = self.config.resolved_worker_count().min(leaves.len());
        debug!(
            elements = input.len(),
            leaves = leaves.len(),
            workers,
            "reducing"
        );

        let partials = if workers <= 1 {
            run_guarded(0, || fold_leaves_inline(input, &leaves, &combine))?
        } else {
            self.fold_leaves(input, &leaves, workers, &combine)?
        };
        // Upper combines run on the calling thread.
        run_guarded(0, || {
            let mut next = 0;
            let root = fold_upper(0, input.len(), cutoff, &partials, &mut next, &combine)?;
            debug_assert_eq!(next, partials.len());
            Ok(root.into_owned())
        })
    }

    /// Run every leaf on a pool of `workers` scoped threads and return the
    /// leaf results in leaf order.
    fn fold_leaves<T, C>(
        &self,
        input: &[T],
        leaves: &[Partition],
        workers: usize,
        combine: &C,
    ) -> Result<Vec<T>, EngineError>
    where
        T: Clone + Send + Sync,
        C: Fn(&T, &T) -> Result<T, TransformError> + Sync,
    {
        let (task_tx, task_rx) = crossbeam_channel::unbounded();
        for (leaf, part) in leaves.iter().enumerate() {
            let _ = task_tx.send((leaf, *part));
        }
        // Workers exit once the queue is empty.
        drop(task_tx);
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded::<LeafResult<T>>();

        thread::scope(|scope| {
            let mut handles = SmallVec::<[_; INLINE_WORKERS]>::new();
            let mut spawn_error = None;
            for worker in 0..workers {
                let tasks = task_rx.clone();
                let replies = reply_tx.clone();
                let spawned = self.config.thread_builder(worker).spawn_scoped(scope, move || {
                    leaf_worker(worker, input, combine, tasks, replies)
                });
                match spawned {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(e) => {
                        error!(worker, error = %e, "failed to spawn reduce worker");
                        spawn_error = Some(EngineError::ThreadSpawnFailed {
                            worker,
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }
            // Only workers hold reply senders now; the loop below ends when
            // the last one exits.
            drop(reply_tx);

            let mut slots: Vec<Option<T>> = (0..leaves.len()).map(|_| None).collect();
            let mut first_failure: Option<(usize, EngineError)> = None;
            for (leaf, result) in reply_rx.iter() {
                match result {
                    Ok(value) => slots[leaf] = Some(value),
                    Err(e) => {
                        if first_failure.as_ref().map_or(true, |(l, _)| leaf < *l) {
                            first_failure = Some((leaf, e));
                        }
                    }
                }
            }

            let mut panicked = None;
            for (worker, handle) in handles {
                if handle.join().is_err() {
                    warn!(worker, "reduce worker panicked");
                    panicked.get_or_insert(EngineError::WorkerPanicked { worker });
                }
            }

            if let Some(e) = spawn_error
                .or(first_failure.map(|(_, e)| e))
                .or(panicked)
            {
                return Err(e);
            }
            Ok(slots.into_iter().flatten().collect())
        })
    }
}
