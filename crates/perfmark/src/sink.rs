//! Reporting sinks for aggregates and diagnostics.

use std::sync::{Arc, Mutex, PoisonError};

use crate::aggregator::BatchResult;

/// Destination for finalized aggregates and diagnostic lines.
///
/// Delivery happens synchronously from inside `measure`, so implementations
/// should be cheap; anything expensive belongs behind the implementor's own
/// queue.
pub trait ReportSink: Send {
    /// A batch finalized with the given aggregate.
    fn batch_result(&self, result: &BatchResult);

    /// An informational measurement, delivered only while reporting is
    /// enabled.
    fn diagnostic(&self, name: &str, duration_ms: f64);
}

/// Default sink that logs through `tracing` under the `perf` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn batch_result(&self, result: &BatchResult) {
        tracing::info!(
            target: "perf",
            net_ms = format_args!("{:.3}", result.net_ms),
            terminal_ms = result.terminal_ms,
            overhead_ms = result.overhead_ms,
            measurements = result.measurement_count,
            "batch result"
        );
    }

    fn diagnostic(&self, name: &str, duration_ms: f64) {
        tracing::debug!(target: "perf", name, duration_ms, "measurement");
    }
}

/// Sink that retains everything reported, for tests and in-process
/// inspection.
///
/// Cloning shares the underlying storage, so a clone handed to the engine
/// and a clone kept by the caller observe the same reports.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    batch_results: Vec<BatchResult>,
    diagnostics: Vec<(String, f64)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All batch results reported so far, in order.
    pub fn batch_results(&self) -> Vec<BatchResult> {
        self.lock().batch_results.clone()
    }

    /// All diagnostic lines reported so far, in order.
    pub fn diagnostics(&self) -> Vec<(String, f64)> {
        self.lock().diagnostics.clone()
    }

    /// Discard everything captured so far.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.batch_results.clear();
        state.diagnostics.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportSink for MemorySink {
    fn batch_result(&self, result: &BatchResult) {
        self.lock().batch_results.push(result.clone());
    }

    fn diagnostic(&self, name: &str, duration_ms: f64) {
        self.lock().diagnostics.push((name.to_string(), duration_ms));
    }
}
