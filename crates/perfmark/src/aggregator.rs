//! Measurement classification and batch aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PerfError, PerfResult};
use crate::measurement::{Measurement, Tag};
use crate::sink::{ReportSink, TracingSink};

/// Aggregate computed when a batch finalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Terminal duration minus accumulated overhead, in milliseconds
    pub net_ms: f64,
    /// The terminal measurement's raw duration
    pub terminal_ms: f64,
    /// Sum of overhead durations observed during the batch
    pub overhead_ms: f64,
    /// Measurements observed during the batch, terminal included
    pub measurement_count: usize,
    /// When the batch finalized
    pub finalized_at: DateTime<Utc>,
}

/// What the aggregator did with an observed measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    /// Overhead added to the running sum.
    Accumulated,
    /// Informational measurement reported to the sink.
    Reported,
    /// Informational measurement dropped because reporting is disabled.
    Dropped,
    /// Terminal measurement finalized the batch.
    Finalized(BatchResult),
}

/// Consumes the measurement stream in arrival order and folds it into
/// per-batch aggregates.
///
/// Overhead measurements accumulate; the terminal measurement finalizes the
/// batch (`net = terminal - overhead_sum`), reports the result to the sink,
/// and closes the batch until [`begin_batch`](ObserverAggregator::begin_batch)
/// is called once the mark registry has been cleared. Informational
/// measurements are reported only while enabled and never affect the
/// aggregate.
pub struct ObserverAggregator {
    sink: Box<dyn ReportSink>,
    overhead_ms: f64,
    measurement_count: usize,
    /// Set when a terminal finalizes; cleared by `begin_batch`.
    finalized: bool,
    enabled: bool,
    last_result: Option<BatchResult>,
}

impl Default for ObserverAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObserverAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverAggregator")
            .field("overhead_ms", &self.overhead_ms)
            .field("measurement_count", &self.measurement_count)
            .field("finalized", &self.finalized)
            .field("enabled", &self.enabled)
            .field("last_result", &self.last_result)
            .finish_non_exhaustive()
    }
}

impl ObserverAggregator {
    /// Create an aggregator reporting through the default tracing sink.
    pub fn new() -> Self {
        Self::with_sink(Box::new(TracingSink))
    }

    /// Create an aggregator reporting through a custom sink.
    pub fn with_sink(sink: Box<dyn ReportSink>) -> Self {
        Self {
            sink,
            overhead_ms: 0.0,
            measurement_count: 0,
            finalized: false,
            enabled: false,
            last_result: None,
        }
    }

    /// Enable or disable informational reporting.
    ///
    /// The flag gates diagnostics only; overhead accumulation and terminal
    /// computation are identical either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether informational reporting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Overhead accumulated so far in the current batch, in milliseconds.
    pub fn overhead_ms(&self) -> f64 {
        self.overhead_ms
    }

    /// The most recently finalized aggregate, if any batch has finalized.
    pub fn last_result(&self) -> Option<&BatchResult> {
        self.last_result.as_ref()
    }

    /// Start a new batch.
    ///
    /// Called after the mark registry has been cleared; resets the overhead
    /// sum and measurement count and reopens the batch for a new terminal.
    pub fn begin_batch(&mut self) {
        self.overhead_ms = 0.0;
        self.measurement_count = 0;
        self.finalized = false;
    }

    /// Process one measurement in arrival order.
    ///
    /// A terminal measurement arriving while the previous batch has
    /// finalized but not yet been cleared is rejected with
    /// [`PerfError::AmbiguousResult`] and mutates nothing.
    pub fn observe(&mut self, measurement: &Measurement) -> PerfResult<Observed> {
        match measurement.tag() {
            Tag::Overhead => {
                self.measurement_count += 1;
                self.overhead_ms += measurement.duration_ms;
                Ok(Observed::Accumulated)
            }
            Tag::Terminal => {
                if self.finalized {
                    return Err(PerfError::AmbiguousResult {
                        name: measurement.name.clone(),
                    });
                }
                self.measurement_count += 1;

                let result = BatchResult {
                    net_ms: measurement.duration_ms - self.overhead_ms,
                    terminal_ms: measurement.duration_ms,
                    overhead_ms: self.overhead_ms,
                    measurement_count: self.measurement_count,
                    finalized_at: Utc::now(),
                };

                self.overhead_ms = 0.0;
                self.finalized = true;
                self.last_result = Some(result.clone());
                self.sink.batch_result(&result);

                Ok(Observed::Finalized(result))
            }
            Tag::Informational => {
                self.measurement_count += 1;
                if self.enabled {
                    self.sink.diagnostic(&measurement.name, measurement.duration_ms);
                    Ok(Observed::Reported)
                } else {
                    Ok(Observed::Dropped)
                }
            }
        }
    }
}
