//! Sample transforms and test fixtures for fanout development.
//!
//! The sample transforms mirror the classic demonstrations of the engine:
//! squaring, reciprocals, and building a `(x, 2x)` pair, each available in
//! allocating (`Fn(&I) -> O`) and, where useful, in-place
//! (`Fn(&I, &mut O)`) form. [`fixtures`] holds transforms that count,
//! fail, or panic on demand.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingTransform, FailOn, PanicOn};

/// A value paired with its double.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tup {
    pub orig: i32,
    pub orig_times_2: i32,
}

/// `[0, 1, ..., n - 1]` as `i32`s.
///
/// # Panics
///
/// Panics if `n` exceeds `i32::MAX`.
pub fn sample_input(n: usize) -> Vec<i32> {
    let n = i32::try_from(n).expect("sample size fits in i32");
    (0..n).collect()
}

pub fn square(x: &i32) -> i32 {
    x * x
}

pub fn square_in_place(x: &i32, out: &mut i32) {
    *out = x * x;
}

/// `1 / x` as `f32`. Zero maps to positive infinity.
pub fn fraction(x: &i32) -> f32 {
    1.0 / *x as f32
}

pub fn eval_tup(x: &i32) -> Tup {
    Tup {
        orig: *x,
        orig_times_2: x * 2,
    }
}

pub fn eval_tup_fast(x: &i32, out: &mut Tup) {
    out.orig = *x;
    out.orig_times_2 = x * 2;
}

/// Associative combine for any `Copy + Add` type.
pub fn add<T>(a: &T, b: &T) -> T
where
    T: Copy + std::ops::Add<Output = T>,
{
    *a + *b
}

/// Non-associative combine recording the fold tree: `shape("a", "b") == "(ab)"`.
///
/// Two reductions with this combine agree only if they grouped the
/// elements identically.
pub fn shape(a: &String, b: &String) -> String {
    format!("({a}{b})")
}

/// One-character leaves for [`shape`]: `"0", "1", ..., "9", "0", ...`.
pub fn shape_leaves(n: usize) -> Vec<String> {
    (0..n).map(|i| (i % 10).to_string()).collect()
}

/// Reference fold with the same `mid = n / 2` split the engine uses.
///
/// # Panics
///
/// Panics if `input` is empty.
pub fn sequential_tree_fold<T, C>(input: &[T], combine: &C) -> T
where
    T: Clone,
    C: Fn(&T, &T) -> T,
{
    match input.len() {
        0 => panic!("sequential_tree_fold on empty input"),
        1 => input[0].clone(),
        n => {
            let (l, r) = input.split_at(n / 2);
            combine(
                &sequential_tree_fold(l, combine),
                &sequential_tree_fold(r, combine),
            )
        }
    }
}
