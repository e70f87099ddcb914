//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] is the builder-input for constructing an
//! [`Engine`](crate::Engine). [`validate()`](EngineConfig::validate) checks
//! structural invariants once, at construction; per-call worker counts are
//! derived from it with [`workers_for()`](EngineConfig::workers_for).

use std::error::Error;
use std::fmt;
use std::thread;

/// Upper bound on an explicit worker count.
pub const MAX_WORKERS: usize = 256;

/// Smallest accepted worker stack size, in bytes.
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// Default subrange length at or below which reduce runs sequentially.
pub const DEFAULT_REDUCE_CUTOFF: usize = 2048;

/// Worker count used when the platform cannot report its parallelism.
const FALLBACK_WORKERS: usize = 4;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EngineConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Explicit worker count is zero or above [`MAX_WORKERS`].
    InvalidWorkerCount {
        /// The configured value.
        configured: usize,
    },
    /// `reduce_cutoff` is zero.
    ReduceCutoffZero,
    /// Worker stack size is below [`MIN_STACK_SIZE`].
    StackTooSmall {
        /// The configured value, in bytes.
        configured: usize,
    },
    /// Thread name is empty or contains a NUL byte.
    InvalidThreadName {
        /// Description of which rule was violated.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWorkerCount { configured } => {
                write!(
                    f,
                    "worker_count must be in [1, {MAX_WORKERS}], got {configured}"
                )
            }
            Self::ReduceCutoffZero => write!(f, "reduce_cutoff must be at least 1"),
            Self::StackTooSmall { configured } => {
                write!(
                    f,
                    "stack_size {configured} is below minimum of {MIN_STACK_SIZE} bytes"
                )
            }
            Self::InvalidThreadName { reason } => write!(f, "invalid thread name: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Complete configuration for constructing an [`Engine`](crate::Engine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, MAX_WORKERS]`).
    pub worker_count: Option<usize>,
    /// Subranges of at most this many elements are reduced sequentially
    /// on a single worker. Larger subranges are split and fanned out.
    /// Default: [`DEFAULT_REDUCE_CUTOFF`].
    pub reduce_cutoff: usize,
    /// Stack size for worker threads. `None` = platform default.
    pub stack_size: Option<usize>,
    /// Prefix for worker thread names; workers are named `{prefix}-{index}`.
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            reduce_cutoff: DEFAULT_REDUCE_CUTOFF,
            stack_size: None,
            thread_name: "fanout-worker".to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration with an explicit worker count and defaults elsewhere.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count: Some(worker_count),
            ..Self::default()
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Explicit worker count in [1, MAX_WORKERS].
        if let Some(n) = self.worker_count {
            if n == 0 || n > MAX_WORKERS {
                return Err(ConfigError::InvalidWorkerCount { configured: n });
            }
        }
        // 2. Cutoff >= 1, otherwise the split never bottoms out in a leaf.
        if self.reduce_cutoff == 0 {
            return Err(ConfigError::ReduceCutoffZero);
        }
        // 3. Stack size, if present, >= MIN_STACK_SIZE.
        if let Some(bytes) = self.stack_size {
            if bytes < MIN_STACK_SIZE {
                return Err(ConfigError::StackTooSmall { configured: bytes });
            }
        }
        // 4. Thread name usable by std::thread::Builder::name.
        if self.thread_name.is_empty() {
            return Err(ConfigError::InvalidThreadName {
                reason: "name is empty".to_string(),
            });
        }
        if self.thread_name.contains('\0') {
            return Err(ConfigError::InvalidThreadName {
                reason: "name contains a NUL byte".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the configured worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, MAX_WORKERS]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, MAX_WORKERS),
            None => thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_WORKERS)
                .clamp(1, MAX_WORKERS),
        }
    }

    /// Number of workers to use for `n` elements.
    ///
    /// Never more workers than elements, never fewer than one.
    pub fn workers_for(&self, n: usize) -> usize {
        self.resolved_worker_count().min(n).max(1)
    }

    /// Thread builder for worker `index`.
    pub(crate) fn thread_builder(&self, index: usize) -> thread::Builder {
        let builder = thread::Builder::new().name(format!("{}-{index}", self.thread_name));
        match self.stack_size {
            Some(bytes) => builder.stack_size(bytes),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = EngineConfig::with_workers(0);
        match cfg.validate() {
            Err(ConfigError::InvalidWorkerCount { configured: 0 }) => {}
            other => panic!("expected InvalidWorkerCount, got {other:?}"),
        }
    }

    #[test]
    fn too_many_workers_rejected() {
        let cfg = EngineConfig::with_workers(MAX_WORKERS + 1);
        match cfg.validate() {
            Err(ConfigError::InvalidWorkerCount { .. }) => {}
            other => panic!("expected InvalidWorkerCount, got {other:?}"),
        }
    }

    #[test]
    fn zero_cutoff_rejected() {
        let cfg = EngineConfig {
            reduce_cutoff: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ReduceCutoffZero));
    }

    #[test]
    fn small_stack_rejected() {
        let cfg = EngineConfig {
            stack_size: Some(1024),
            ..EngineConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::StackTooSmall { configured: 1024 }) => {}
            other => panic!("expected StackTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn bad_thread_names_rejected() {
        let empty = EngineConfig {
            thread_name: String::new(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            empty.validate(),
            Err(ConfigError::InvalidThreadName { .. })
        ));
        let nul = EngineConfig {
            thread_name: "bad\0name".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            nul.validate(),
            Err(ConfigError::InvalidThreadName { .. })
        ));
    }

    #[test]
    fn resolved_worker_count_clamps_explicit() {
        assert_eq!(EngineConfig::with_workers(0).resolved_worker_count(), 1);
        assert_eq!(
            EngineConfig::with_workers(10_000).resolved_worker_count(),
            MAX_WORKERS
        );
        assert_eq!(EngineConfig::with_workers(6).resolved_worker_count(), 6);
    }

    #[test]
    fn resolved_worker_count_auto() {
        let count = EngineConfig::default().resolved_worker_count();
        assert!(
            (1..=MAX_WORKERS).contains(&count),
            "auto count {count} out of [1,{MAX_WORKERS}]"
        );
    }

    #[test]
    fn workers_for_never_exceeds_elements() {
        let cfg = EngineConfig::with_workers(8);
        assert_eq!(cfg.workers_for(0), 1);
        assert_eq!(cfg.workers_for(3), 3);
        assert_eq!(cfg.workers_for(8), 8);
        assert_eq!(cfg.workers_for(1_000), 8);
    }

    #[test]
    fn display_mentions_limits() {
        let msg = format!("{}", ConfigError::InvalidWorkerCount { configured: 0 });
        assert!(msg.contains("256"));
        let msg = format!("{}", ConfigError::StackTooSmall { configured: 10 });
        assert!(msg.contains("65536"));
    }
}
