//! Boundary sink for JSON-shaped result records.

use serde_json::Value;

/// Sink consuming JSON-shaped result records at the engine boundary.
///
/// The engine pushes one record per completed phase; what happens to them
/// (stdout, a file, a collector) is the caller's business.
pub trait Reporter {
    /// Consume one record.
    fn report(&mut self, record: &Value);
}

/// Reporter that keeps every record in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    records: Vec<Value>,
}

impl CollectingReporter {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the collected records.
    #[must_use]
    pub fn records(&self) -> &[Value] {
        &self.records
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, record: &Value) {
        self.records.push(record.clone());
    }
}
