//! Transforms that observe or sabotage engine execution.
//!
//! - [`CountingTransform`] records how many times each index was evaluated.
//! - [`FailOn`] returns a [`TransformError`] for chosen input values.
//! - [`PanicOn`] panics on a chosen input value.

use std::sync::atomic::{AtomicUsize, Ordering};

use fanout_core::TransformError;

/// Squares its input and counts evaluations per input value.
///
/// Inputs are treated as indices into the counter table, so use it with
/// [`sample_input`](crate::sample_input) style data in `[0, n)`.
pub struct CountingTransform {
    hits: Vec<AtomicUsize>,
}

impl CountingTransform {
    pub fn new(n: usize) -> Self {
        Self {
            hits: (0..n).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Square `x`, recording one evaluation of index `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` is negative or outside the counter table.
    pub fn call(&self, x: &i32) -> i32 {
        let idx = usize::try_from(*x).expect("counting input must be non-negative");
        self.hits[idx].fetch_add(1, Ordering::Relaxed);
        x * x
    }

    /// In-place form of [`call`](Self::call).
    pub fn call_in_place(&self, x: &i32, out: &mut i32) {
        *out = self.call(x);
    }

    /// Evaluations of index `i` so far.
    pub fn hits(&self, i: usize) -> usize {
        self.hits[i].load(Ordering::Relaxed)
    }

    /// Total evaluations across all indices.
    pub fn calls(&self) -> usize {
        self.hits.iter().map(|h| h.load(Ordering::Relaxed)).sum()
    }

    /// True if every index was evaluated exactly once.
    pub fn each_exactly_once(&self) -> bool {
        self.hits.iter().all(|h| h.load(Ordering::Relaxed) == 1)
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for h in &self.hits {
            h.store(0, Ordering::Relaxed);
        }
    }
}

/// Doubles its input but fails on any value in `rejected`.
pub struct FailOn {
    pub rejected: Vec<i32>,
    call_count: AtomicUsize,
}

impl FailOn {
    pub fn new(rejected: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rejected: rejected.into_iter().collect(),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call(&self, x: &i32) -> Result<i32, TransformError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.rejected.contains(x) {
            return Err(TransformError::Failed {
                reason: format!("deliberate failure on {x}"),
            });
        }
        Ok(x * 2)
    }

    /// Combine form: fails when either operand is rejected, else adds.
    pub fn combine(&self, a: &i32, b: &i32) -> Result<i32, TransformError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match [a, b].into_iter().find(|v| self.rejected.contains(*v)) {
            Some(v) => Err(TransformError::Failed {
                reason: format!("deliberate failure on {v}"),
            }),
            None => Ok(a.wrapping_add(*b)),
        }
    }

    /// How many times the transform has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.call_count.store(0, Ordering::Relaxed);
    }
}

/// Identity transform that panics on one value.
pub struct PanicOn {
    pub value: i32,
}

impl PanicOn {
    pub fn new(value: i32) -> Self {
        Self { value }
    }

    pub fn call(&self, x: &i32) -> i32 {
        if *x == self.value {
            panic!("deliberate panic on {x}");
        }
        *x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_tracks_each_index() {
        let c = CountingTransform::new(3);
        assert_eq!(c.call(&2), 4);
        let mut out = 0;
        c.call_in_place(&1, &mut out);
        assert_eq!(out, 1);
        assert_eq!(c.hits(0), 0);
        assert_eq!(c.hits(1), 1);
        assert_eq!(c.calls(), 2);
        assert!(!c.each_exactly_once());
        c.call(&0);
        assert!(c.each_exactly_once());
        c.reset();
        assert_eq!(c.calls(), 0);
    }

    #[test]
    fn fail_on_rejects_chosen_values() {
        let f = FailOn::new([3]);
        assert_eq!(f.call(&2), Ok(4));
        assert!(f.call(&3).is_err());
        assert_eq!(f.combine(&1, &2), Ok(3));
        assert_eq!(
            f.combine(&1, &3),
            Err(TransformError::Failed {
                reason: "deliberate failure on 3".into()
            })
        );
        assert_eq!(f.calls(), 4);
        f.reset();
        assert_eq!(f.calls(), 0);
    }

    #[test]
    #[should_panic(expected = "deliberate panic on 5")]
    fn panic_on_panics() {
        PanicOn::new(5).call(&5);
    }
}
