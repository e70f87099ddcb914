//! Benchmark profiles for the fanout engine.
//!
//! - [`reference_len`] / [`stress_len`]: element counts for the standard runs
//! - [`int_profile`], [`float_profile`]: deterministic inputs
//! - [`bench_engine`]: an engine with an explicit worker count and cutoff

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fanout_engine::{ConfigError, Engine, EngineConfig};

/// Element count for the reference profile (64K elements).
pub const fn reference_len() -> usize {
    1 << 16
}

/// Element count for the stress profile (1M elements).
pub const fn stress_len() -> usize {
    1 << 20
}

/// `[0, 1, ..., n - 1]` as `i64`.
pub fn int_profile(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

/// `n` deterministic values in `[0, 1)`, generated by a xorshift walk from `seed`.
pub fn float_profile(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed | 1;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

/// Build an engine with `workers` threads and the given reduce cutoff.
pub fn bench_engine(workers: usize, reduce_cutoff: usize) -> Result<Engine, ConfigError> {
    Engine::new(EngineConfig {
        reduce_cutoff,
        ..EngineConfig::with_workers(workers)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_profile_is_deterministic_and_in_range() {
        let a = float_profile(1000, 42);
        let b = float_profile(1000, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|x| (0.0..1.0).contains(x)));
        assert_ne!(a, float_profile(1000, 7));
    }

    #[test]
    fn bench_engine_rejects_zero_cutoff() {
        assert!(bench_engine(4, 0).is_err());
        assert_eq!(bench_engine(4, 16).unwrap().worker_count(), 4);
    }
}
