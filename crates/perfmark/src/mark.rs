//! Start-mark registry.

use std::collections::HashMap;
use std::time::Instant;

/// A recorded start timestamp associated with a correlation id.
#[derive(Debug, Clone)]
pub struct Mark {
    id: String,
    instant: Instant,
}

impl Mark {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            instant: Instant::now(),
        }
    }

    /// The correlation id this mark was recorded under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The monotonic instant the mark was recorded at.
    pub fn instant(&self) -> Instant {
        self.instant
    }

    /// Elapsed time since this mark, in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.instant.elapsed().as_secs_f64() * 1000.0
    }
}

/// Registry of start marks for in-flight operations.
///
/// Marks are read, not consumed, when a measurement is taken; they are
/// removed in bulk by [`clear`](MarkRegistry::clear) when a batch finalizes,
/// or individually by [`remove`](MarkRegistry::remove) when an operation
/// fails before measuring.
#[derive(Debug, Default)]
pub struct MarkRegistry {
    marks: HashMap<String, Mark>,
}

impl MarkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a start mark for `id` at the current instant.
    ///
    /// Re-recording an existing id overwrites the previous mark (last write
    /// wins); timing use is fire-and-forget, so this is not an error.
    pub fn record(&mut self, id: &str) {
        self.marks.insert(id.to_string(), Mark::new(id));
    }

    /// Look up the mark for `id`, if it is still present.
    pub fn lookup(&self, id: &str) -> Option<&Mark> {
        self.marks.get(id)
    }

    /// Remove a single mark, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Mark> {
        self.marks.remove(id)
    }

    /// Remove all marks. Idempotent.
    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// Whether a mark exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.marks.contains_key(id)
    }

    /// Number of marks currently held.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether the registry holds no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_record_and_lookup() {
        let mut registry = MarkRegistry::new();
        registry.record("op-1");

        let mark = registry.lookup("op-1").unwrap();
        assert_eq!(mark.id(), "op-1");
        assert!(registry.contains("op-1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let registry = MarkRegistry::new();
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_record_overwrites_last_write_wins() {
        let mut registry = MarkRegistry::new();
        registry.record("op-1");
        let first = registry.lookup("op-1").unwrap().instant();

        sleep(Duration::from_millis(5));
        registry.record("op-1");
        let second = registry.lookup("op-1").unwrap().instant();

        assert!(second > first);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_elapsed_ms_grows() {
        let mut registry = MarkRegistry::new();
        registry.record("op-1");

        sleep(Duration::from_millis(10));
        let elapsed = registry.lookup("op-1").unwrap().elapsed_ms();
        assert!(elapsed >= 9.0, "elapsed should be at least 9ms, got {}", elapsed);
    }

    #[test]
    fn test_remove() {
        let mut registry = MarkRegistry::new();
        registry.record("op-1");

        let removed = registry.remove("op-1").unwrap();
        assert_eq!(removed.id(), "op-1");
        assert!(registry.is_empty());

        assert!(registry.remove("op-1").is_none());
    }

    #[test]
    fn test_clear_idempotent() {
        let mut registry = MarkRegistry::new();
        registry.record("a");
        registry.record("b");

        registry.clear();
        assert!(registry.is_empty());

        registry.clear();
        assert!(registry.is_empty());
    }
}
