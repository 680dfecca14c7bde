//! The public instrumentation engine.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::aggregator::{BatchResult, Observed, ObserverAggregator};
use crate::error::{PerfError, PerfResult};
use crate::id::IdGenerator;
use crate::mark::{Mark, MarkRegistry};
use crate::measurement::Measurement;
use crate::sink::ReportSink;

/// Process-wide default engine.
static GLOBAL_PERF: OnceLock<Perf> = OnceLock::new();

/// Get the process-wide default engine.
///
/// Independent [`Perf`] instances can be constructed directly for isolation;
/// this singleton is a convenience for callers that want one shared engine.
pub fn global() -> &'static Perf {
    GLOBAL_PERF.get_or_init(Perf::new)
}

/// Enable informational reporting on the default engine.
pub fn enable() {
    global().enable();
}

/// Disable informational reporting on the default engine.
pub fn disable() {
    global().disable();
}

/// Record a start mark on the default engine.
pub fn mark(id: &str) {
    global().mark(id);
}

/// Compute and publish a measurement on the default engine.
pub fn measure(name: &str, start_id: &str) -> PerfResult<Measurement> {
    global().measure(name, start_id)
}

/// Time a synchronous unit of work on the default engine.
pub fn wrap<T>(name: &str, work: impl FnOnce() -> T) -> T {
    global().wrap(name, work)
}

/// Time an asynchronous unit of work on the default engine.
pub async fn wrap_async<T, F>(name: &str, work: F) -> T
where
    F: Future<Output = T>,
{
    global().wrap_async(name, work).await
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Registry and aggregator state stay usable after a panic; the failed
/// operation's mark is released by its guard during unwinding.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The measurement engine: correlates start marks with named measurements
/// and drives classification and batch aggregation.
///
/// All delivery is synchronous inside [`measure`](Perf::measure): the
/// aggregator sees measurements in exact call order, and a wrapped operation
/// cannot return to its caller before its measurement has been classified
/// and, if terminal, aggregated.
///
/// # Example
///
/// ```rust
/// use perfmark::Perf;
///
/// let perf = Perf::new();
///
/// let rows = perf.wrap("query#results", || {
///     let normalized = perf.wrap("casing#filter", || vec![1, 2, 3]);
///     normalized.len()
/// });
/// assert_eq!(rows, 3);
///
/// let result = perf.last_batch_result().unwrap();
/// assert!(result.net_ms >= 0.0);
/// assert_eq!(result.measurement_count, 2);
/// ```
#[derive(Debug)]
pub struct Perf {
    ids: IdGenerator,
    registry: Mutex<MarkRegistry>,
    aggregator: Mutex<ObserverAggregator>,
}

impl Default for Perf {
    fn default() -> Self {
        Self::new()
    }
}

impl Perf {
    /// Create an engine reporting through the default tracing sink.
    pub fn new() -> Self {
        Self {
            ids: IdGenerator::new(),
            registry: Mutex::new(MarkRegistry::new()),
            aggregator: Mutex::new(ObserverAggregator::new()),
        }
    }

    /// Create an engine reporting through a custom sink.
    pub fn with_sink(sink: Box<dyn ReportSink>) -> Self {
        Self {
            ids: IdGenerator::new(),
            registry: Mutex::new(MarkRegistry::new()),
            aggregator: Mutex::new(ObserverAggregator::with_sink(sink)),
        }
    }

    /// Enable informational reporting.
    ///
    /// Gates diagnostics only; the computed aggregate is identical whether
    /// reporting is enabled or not.
    pub fn enable(&self) {
        lock(&self.aggregator).set_enabled(true);
    }

    /// Disable informational reporting.
    pub fn disable(&self) {
        lock(&self.aggregator).set_enabled(false);
    }

    /// Whether informational reporting is enabled.
    pub fn is_enabled(&self) -> bool {
        lock(&self.aggregator).is_enabled()
    }

    /// Record a start mark for `id` at the current instant.
    ///
    /// Re-recording an existing id overwrites it (last write wins).
    pub fn mark(&self, id: &str) {
        lock(&self.registry).record(id);
    }

    /// Compute a measurement from the start mark `start_id` to now and
    /// publish it synchronously.
    ///
    /// Returns [`PerfError::UnknownMark`] if the id was never recorded or
    /// was already cleared by a prior batch finalization; nothing is
    /// accumulated in that case. A terminal measurement finalizes the
    /// current batch, clears the registry, and starts a new batch before
    /// this call returns.
    pub fn measure(&self, name: &str, start_id: &str) -> PerfResult<Measurement> {
        let duration_ms = lock(&self.registry)
            .lookup(start_id)
            .map(Mark::elapsed_ms)
            .ok_or_else(|| PerfError::UnknownMark {
                id: start_id.to_string(),
            })?;

        let measurement = Measurement::new(name, duration_ms);

        let mut aggregator = lock(&self.aggregator);
        let outcome = aggregator.observe(&measurement)?;
        if matches!(outcome, Observed::Finalized(_)) {
            lock(&self.registry).clear();
            aggregator.begin_batch();
        }

        Ok(measurement)
    }

    /// The most recently finalized aggregate, if any batch has finalized.
    pub fn last_batch_result(&self) -> Option<BatchResult> {
        lock(&self.aggregator).last_result().cloned()
    }

    /// Number of start marks currently held for in-flight operations.
    pub fn pending_marks(&self) -> usize {
        lock(&self.registry).len()
    }

    /// Time a synchronous unit of work, returning its value untouched.
    ///
    /// If `work` panics, the mark is released during unwinding and no
    /// measurement is emitted. An aggregator fault while recording the
    /// measurement is logged at `warn` rather than returned, so the value
    /// always passes through.
    pub fn wrap<T>(&self, name: &str, work: impl FnOnce() -> T) -> T {
        let guard = self.start(name);
        let value = work();
        guard.complete();
        value
    }

    /// Time a fallible synchronous unit of work.
    ///
    /// On `Err` the mark is released, no measurement is emitted, and the
    /// error propagates unchanged.
    pub fn try_wrap<T, E>(
        &self,
        name: &str,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let guard = self.start(name);
        let value = work()?;
        guard.complete();
        Ok(value)
    }

    /// Time an asynchronous unit of work, returning its value untouched.
    ///
    /// The engine suspends with the work across `.await`, so other
    /// operations may start and interleave their own mark/measure cycles;
    /// unique correlation ids keep their marks from colliding. If the
    /// returned future is dropped before completion, the mark is released
    /// and no measurement is emitted.
    pub async fn wrap_async<T, F>(&self, name: &str, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let guard = self.start(name);
        let value = work.await;
        guard.complete();
        value
    }

    /// Time a fallible asynchronous unit of work.
    ///
    /// On `Err` the mark is released, no measurement is emitted, and the
    /// error propagates unchanged.
    pub async fn try_wrap_async<T, E, F>(&self, name: &str, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let guard = self.start(name);
        let value = work.await?;
        guard.complete();
        Ok(value)
    }

    fn start<'a>(&'a self, name: &'a str) -> MarkGuard<'a> {
        let id = self.ids.generate();
        self.mark(&id);
        MarkGuard {
            perf: self,
            name,
            id,
            armed: true,
        }
    }

    fn release_mark(&self, id: &str) {
        lock(&self.registry).remove(id);
    }
}

/// Releases an operation's start mark unless the operation completed.
///
/// Covers panics in synchronous work and drops of unfinished async work;
/// either way the mark never dangles in the registry.
struct MarkGuard<'a> {
    perf: &'a Perf,
    name: &'a str,
    id: String,
    armed: bool,
}

impl MarkGuard<'_> {
    fn complete(mut self) {
        self.armed = false;
        if let Err(err) = self.perf.measure(self.name, &self.id) {
            tracing::warn!(
                target: "perf",
                error = %err,
                name = self.name,
                "measurement not recorded"
            );
        }
    }
}

impl Drop for MarkGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.perf.release_mark(&self.id);
        }
    }
}
