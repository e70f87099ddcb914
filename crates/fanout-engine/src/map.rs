//! Element-wise map: allocating and in-place ("fast") variants.
//!
//! Both variants partition the index space identically and differ only in
//! how a result reaches its slot. The allocating transform returns an
//! owned value which the engine moves into the output buffer; the in-place
//! transform writes straight into the caller-owned slot.

use fanout_core::{try_buffer, EngineError, Partition, TransformError};

use crate::engine::Engine;

/// Read-only description of one map invocation, shared by every worker.
struct Job<'a, I, F> {
    input: &'a [I],
    transform: &'a F,
}

impl<'a, I, F> Job<'a, I, F> {
    fn new(input: &'a [I], transform: &'a F) -> Self {
        Self { input, transform }
    }

    fn len(&self) -> usize {
        self.input.len()
    }

    /// Evaluate the partition's elements into `out`, stopping at the first failure.
    fn run_into<O>(&self, part: Partition, inp: &[I], out: &mut [O]) -> Result<(), EngineError>
    where
        F: Fn(&I) -> Result<O, TransformError>,
    {
        for (k, (x, slot)) in inp.iter().zip(out.iter_mut()).enumerate() {
            *slot = (self.transform)(x).map_err(|source| EngineError::Transform {
                index: part.offset + k,
                source,
            })?;
        }
        Ok(())
    }

    /// Evaluate the partition's elements into a fresh chunk.
    fn run_collect<O>(&self, part: Partition) -> Result<Vec<O>, EngineError>
    where
        F: Fn(&I) -> Result<O, TransformError>,
    {
        let mut chunk = try_buffer(part.len)?;
        for (k, x) in self.input[part.range()].iter().enumerate() {
            let value = (self.transform)(x).map_err(|source| EngineError::Transform {
                index: part.offset + k,
                source,
            })?;
            chunk.push(value);
        }
        Ok(chunk)
    }
}

fn check_lengths(input: usize, output: usize) -> Result<(), EngineError> {
    if input != output {
        return Err(EngineError::LengthMismatch { input, output });
    }
    Ok(())
}

impl Engine {
    /// Apply `f` to every element of `input`, writing `f(&input[i])` into
    /// `output[i]`.
    ///
    /// Blocks until every worker has finished. Previous contents of
    /// `output` are dropped as they are overwritten.
    ///
    /// # Errors
    ///
    /// [`EngineError::LengthMismatch`] if the buffers differ in length;
    /// [`EngineError::ThreadSpawnFailed`] or [`EngineError::WorkerPanicked`]
    /// if a worker could not run to completion.
    pub fn map<I, O, F>(&self, input: &[I], output: &mut [O], f: F) -> Result<(), EngineError>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> O + Sync,
    {
        self.try_map(input, output, |x| Ok(f(x)))
    }

    /// Fallible form of [`map`](Engine::map).
    ///
    /// A failing element stops its own worker; other workers run to
    /// completion. The failure with the lowest element index is returned
    /// as [`EngineError::Transform`], and `output` is left partially
    /// written.
    pub fn try_map<I, O, F>(&self, input: &[I], output: &mut [O], f: F) -> Result<(), EngineError>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> Result<O, TransformError> + Sync,
    {
        check_lengths(input.len(), output.len())?;
        let job = Job::new(input, &f);
        let workers = self.config.workers_for(job.len());
        self.dispatcher()
            .scatter(job.input, output, workers, |part, inp, out| {
                job.run_into(part, inp, out)
            })
    }

    /// Like [`map`](Engine::map), but allocates and returns the output.
    ///
    /// Each worker builds the chunk for its own partition; chunks are
    /// concatenated in index order, so `O` needs no default value.
    pub fn map_collect<I, O, F>(&self, input: &[I], f: F) -> Result<Vec<O>, EngineError>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> O + Sync,
    {
        self.try_map_collect(input, |x| Ok(f(x)))
    }

    /// Fallible form of [`map_collect`](Engine::map_collect).
    pub fn try_map_collect<I, O, F>(&self, input: &[I], f: F) -> Result<Vec<O>, EngineError>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> Result<O, TransformError> + Sync,
    {
        let job = Job::new(input, &f);
        let workers = self.config.workers_for(job.len());
        self.dispatcher()
            .gather(job.len(), workers, |part| job.run_collect(part))
    }

    /// Apply `f(&input[i], &mut output[i])` to every element.
    ///
    /// Same partitioning and join behavior as [`map`](Engine::map), but the
    /// transform writes directly into the caller-owned slot and the engine
    /// performs no per-element moves.
    pub fn map_fast<I, O, F>(&self, input: &[I], output: &mut [O], f: F) -> Result<(), EngineError>
    where
        I: Sync,
        O: Send,
        F: Fn(&I, &mut O) + Sync,
    {
        check_lengths(input.len(), output.len())?;
        let workers = self.config.workers_for(input.len());
        self.dispatcher().scatter(input, output, workers, |_, inp, out| {
            for (x, slot) in inp.iter().zip(out.iter_mut()) {
                f(x, slot);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use proptest::prelude::*;

    fn engine(workers: usize) -> Engine {
        Engine::new(EngineConfig::with_workers(workers)).unwrap()
    }

    #[test]
    fn map_squares() {
        let input: Vec<i32> = (0..10).collect();
        let mut output = vec![0; 10];
        engine(4).map(&input, &mut output, |x| x * x).unwrap();
        assert_eq!(output, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
    }

    #[test]
    fn map_changes_element_type() {
        let input = [1i32, 2, 4];
        let mut output = vec![String::new(); 3];
        engine(2).map(&input, &mut output, |x| format!("#{x}")).unwrap();
        assert_eq!(output, vec!["#1", "#2", "#4"]);
    }

    #[test]
    fn map_length_mismatch() {
        let input = [1, 2, 3];
        let mut output = [0; 2];
        assert_eq!(
            engine(2).map(&input, &mut output, |x| *x),
            Err(EngineError::LengthMismatch {
                input: 3,
                output: 2
            })
        );
    }

    #[test]
    fn map_fast_length_mismatch() {
        let input = [1, 2];
        let mut output = [0; 3];
        assert!(matches!(
            engine(2).map_fast(&input, &mut output, |x, o| *o = *x),
            Err(EngineError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn map_empty_input() {
        let input: [u8; 0] = [];
        let mut output: [u8; 0] = [];
        engine(4).map(&input, &mut output, |x| *x).unwrap();
        let collected: Vec<u8> = engine(4).map_collect(&input, |x| *x).unwrap();
        assert!(collected.is_empty());
    }

    #[test]
    fn more_workers_than_elements() {
        let input = [3u64, 5];
        let mut output = [0u64; 2];
        engine(16).map(&input, &mut output, |x| x * 2).unwrap();
        assert_eq!(output, [6, 10]);
    }

    #[test]
    fn try_map_reports_lowest_failing_index() {
        let input: Vec<i32> = (0..100).collect();
        let mut output = vec![0; 100];
        let result = engine(4).try_map(&input, &mut output, |x| {
            if *x == 30 || *x == 80 {
                Err(TransformError::Failed {
                    reason: format!("rejected {x}"),
                })
            } else {
                Ok(*x)
            }
        });
        match result {
            Err(EngineError::Transform { index: 30, source }) => {
                assert_eq!(
                    source,
                    TransformError::Failed {
                        reason: "rejected 30".into()
                    }
                );
            }
            other => panic!("expected Transform at 30, got {other:?}"),
        }
    }

    #[test]
    fn try_map_collect_reports_failure() {
        let input: Vec<i32> = (0..10).collect();
        let result: Result<Vec<i32>, _> = engine(3).try_map_collect(&input, |x| {
            if *x == 7 {
                Err(TransformError::AllocationFailed { bytes: 4 })
            } else {
                Ok(*x)
            }
        });
        assert_eq!(
            result,
            Err(EngineError::Transform {
                index: 7,
                source: TransformError::AllocationFailed { bytes: 4 },
            })
        );
    }

    #[test]
    fn map_panic_becomes_error() {
        let input: Vec<i32> = (0..8).collect();
        let mut output = vec![0; 8];
        let result = engine(2).map(&input, &mut output, |x| {
            if *x == 6 {
                panic!("injected");
            }
            *x
        });
        assert_eq!(result, Err(EngineError::WorkerPanicked { worker: 1 }));
    }

    proptest! {
        #[test]
        fn map_and_map_fast_agree(
            input in proptest::collection::vec(-1000i64..1000, 0..300),
            workers in 1usize..12,
        ) {
            let e = engine(workers);
            let mut a = vec![0i64; input.len()];
            let mut b = vec![0i64; input.len()];
            e.map(&input, &mut a, |x| x * x - 3).unwrap();
            e.map_fast(&input, &mut b, |x, slot| *slot = x * x - 3).unwrap();
            prop_assert_eq!(&a, &b);
            let c = e.map_collect(&input, |x| x * x - 3).unwrap();
            prop_assert_eq!(&a, &c);
        }

        #[test]
        fn map_matches_sequential(
            input in proptest::collection::vec(any::<u32>(), 0..500),
            workers in 1usize..20,
        ) {
            let mut out = vec![0u32; input.len()];
            engine(workers).map(&input, &mut out, |x| x.rotate_left(7) ^ 0x5a5a).unwrap();
            let expected: Vec<u32> = input.iter().map(|x| x.rotate_left(7) ^ 0x5a5a).collect();
            prop_assert_eq!(out, expected);
        }
    }
}
