//! The [`Engine`] handle and one-shot convenience functions.

use fanout_core::EngineError;

use crate::config::{ConfigError, EngineConfig};
use crate::dispatch::Dispatcher;

/// Parallel transform/reduce engine.
///
/// Holds a validated [`EngineConfig`]. The engine owns no threads between
/// calls: every operation forks its workers, joins them, and returns, so
/// an `Engine` is cheap to clone and share.
///
/// Operations are implemented across several modules:
///
/// - [`map`](Engine::map), [`try_map`](Engine::try_map),
///   [`map_collect`](Engine::map_collect), [`map_fast`](Engine::map_fast)
/// - [`tabulate`](Engine::tabulate), [`try_tabulate`](Engine::try_tabulate)
/// - [`reduce`](Engine::reduce), [`try_reduce`](Engine::try_reduce)
#[derive(Clone, Debug)]
pub struct Engine {
    pub(crate) config: EngineConfig,
}

impl Engine {
    /// Create an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolved worker count (before per-call clamping to the element count).
    pub fn worker_count(&self) -> usize {
        self.config.resolved_worker_count()
    }

    pub(crate) fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.config)
    }
}

impl Default for Engine {
    /// An engine with [`EngineConfig::default()`], which always validates.
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

/// [`Engine::map`] on a default engine.
pub fn map<I, O, F>(input: &[I], output: &mut [O], f: F) -> Result<(), EngineError>
where
    I: Sync,
    O: Send,
    F: Fn(&I) -> O + Sync,
{
    Engine::default().map(input, output, f)
}

/// [`Engine::map_fast`] on a default engine.
pub fn map_fast<I, O, F>(input: &[I], output: &mut [O], f: F) -> Result<(), EngineError>
where
    I: Sync,
    O: Send,
    F: Fn(&I, &mut O) + Sync,
{
    Engine::default().map_fast(input, output, f)
}

/// [`Engine::tabulate`] on a default engine.
pub fn tabulate<O, F>(n: usize, f: F) -> Result<Vec<O>, EngineError>
where
    O: Send,
    F: Fn(usize) -> O + Sync,
{
    Engine::default().tabulate(n, f)
}

/// [`Engine::reduce`] on a default engine.
pub fn reduce<T, C>(input: &[T], combine: C) -> Result<T, EngineError>
where
    T: Clone + Send + Sync,
    C: Fn(&T, &T) -> T + Sync,
{
    Engine::default().reduce(input, combine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        match Engine::new(EngineConfig::with_workers(0)) {
            Err(ConfigError::InvalidWorkerCount { .. }) => {}
            other => panic!("expected InvalidWorkerCount, got {other:?}"),
        }
    }

    #[test]
    fn default_engine_config_validates() {
        let engine = Engine::default();
        assert!(engine.config().validate().is_ok());
        assert!(engine.worker_count() >= 1);
    }

    #[test]
    fn one_shot_functions() {
        let input = [1i64, 2, 3, 4];
        let mut out = [0i64; 4];
        map(&input, &mut out, |x| x * 3).unwrap();
        assert_eq!(out, [3, 6, 9, 12]);

        map_fast(&input, &mut out, |x, slot| *slot = -x).unwrap();
        assert_eq!(out, [-1, -2, -3, -4]);

        assert_eq!(tabulate(4, |i| i * i).unwrap(), vec![0, 1, 4, 9]);
        assert_eq!(reduce(&input, |a, b| a + b).unwrap(), 10);
    }
}
