//! Measurement events and their classification.

use serde::{Deserialize, Serialize};

/// Classification of a measurement, derived from its name.
///
/// The substring convention (case-insensitive `#filter` / `#results`) is the
/// wire contract with callers; inside the engine the classification travels
/// as this enum. A name carrying both markers classifies as overhead, the
/// marker checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    /// Overhead to subtract from the batch result.
    Overhead,
    /// The batch's terminal result value.
    Terminal,
    /// Anything else; reported as a raw diagnostic when reporting is enabled.
    Informational,
}

impl Tag {
    /// Marker substring for overhead measurements.
    pub const OVERHEAD_MARKER: &'static str = "#filter";
    /// Marker substring for the terminal measurement.
    pub const TERMINAL_MARKER: &'static str = "#results";

    /// Classify a measurement name.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains(Self::OVERHEAD_MARKER) {
            Tag::Overhead
        } else if lower.contains(Self::TERMINAL_MARKER) {
            Tag::Terminal
        } else {
            Tag::Informational
        }
    }
}

/// A named duration produced from a start mark.
///
/// Immutable once created; it has no identity beyond its name and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Free-form operation name, possibly carrying a classification marker
    pub name: String,
    /// Elapsed time in fractional milliseconds
    pub duration_ms: f64,
}

impl Measurement {
    /// Create a measurement.
    pub fn new(name: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            duration_ms,
        }
    }

    /// Classify this measurement by its name.
    pub fn tag(&self) -> Tag {
        Tag::classify(&self.name)
    }
}
