//! Performance Instrumentation and Measurement Aggregation
//!
//! This crate times arbitrary named operations (synchronous or
//! asynchronous), classifies the resulting measurements by a naming
//! convention, and computes a derived "net" duration per batch by
//! subtracting designated overhead measurements from the batch's terminal
//! measurement.
//!
//! Classification is carried by a case-insensitive marker embedded in the
//! operation name:
//!
//! - `#filter` — overhead to subtract from the batch result
//! - `#results` — the batch's terminal result value; finalizes the batch
//! - anything else — informational, reported only while reporting is enabled
//!
//! # Example
//!
//! ```rust
//! use perfmark::{MemorySink, Perf};
//!
//! let sink = MemorySink::new();
//! let perf = Perf::with_sink(Box::new(sink.clone()));
//!
//! let rows = perf.wrap("query#results", || {
//!     let keys = perf.wrap("casing#filter", || vec!["a", "b"]);
//!     keys.len()
//! });
//! assert_eq!(rows, 2);
//!
//! let results = sink.batch_results();
//! assert_eq!(results.len(), 1);
//! assert!(results[0].net_ms >= 0.0);
//! ```
//!
//! # Modules
//!
//! - [`IdGenerator`] - collision-resistant correlation ids
//! - [`MarkRegistry`] - start-mark storage with batch-boundary clearing
//! - [`Measurement`] / [`Tag`] - timing events and their classification
//! - [`ObserverAggregator`] - arrival-order classification and batch math
//! - [`Perf`] - the public engine: `mark`, `measure`, `wrap`, `wrap_async`
//!
//! Delivery is synchronous: a `wrap` call cannot return before its
//! measurement has been classified and, if terminal, aggregated. Engines are
//! explicit instances; [`global()`] exposes a process-wide default for
//! convenience. A unit of work that never settles leaves its mark in the
//! registry and its operation permanently in flight; callers needing
//! cancellation should bound the work themselves (dropping the unfinished
//! wrapper future does release the mark).

mod aggregator;
mod engine;
mod error;
mod id;
mod mark;
mod measurement;
mod sink;

pub use aggregator::{BatchResult, Observed, ObserverAggregator};
pub use engine::{disable, enable, global, mark, measure, wrap, wrap_async, Perf};
pub use error::{PerfError, PerfResult};
pub use id::IdGenerator;
pub use mark::{Mark, MarkRegistry};
pub use measurement::{Measurement, Tag};
pub use sink::{MemorySink, ReportSink, TracingSink};
