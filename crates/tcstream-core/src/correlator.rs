//! Folds lifecycle events into one record per test.

use std::collections::HashMap;

use crate::event::{EventKind, ParsedEvent, TestEvent, TestRecord};

/// Per-run correlation state keyed by `<name>-<flowId>`.
///
/// Start, fault and finish messages for the same test arrive as separate
/// lines, possibly interleaved with other flows when a parallel runner
/// shares the output channel. Records are kept for the lifetime of the
/// correlator; start a new run with [`TestCorrelator::reset`] or a fresh
/// instance.
#[derive(Debug, Default)]
pub struct TestCorrelator {
    records: HashMap<String, TestRecord>,
    order: Vec<String>,
}

impl TestCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply any parsed event.
    ///
    /// Lifecycle events go through [`TestCorrelator::apply_test`] and come
    /// back as the event their record now represents. Every other event is
    /// returned unchanged.
    pub fn apply(&mut self, event: ParsedEvent) -> Option<ParsedEvent> {
        match event.into_lifecycle() {
            Ok((kind, test)) => self.apply_test(kind, test).map(TestRecord::into_event),
            Err(other) => Some(other),
        }
    }

    /// Apply one lifecycle event and return the affected record.
    ///
    /// Starts insert or replace the record. Faults merge into it and return
    /// nothing; the merged record surfaces with the finish. Finishes merge
    /// timing but never replace a fault kind.
    pub fn apply_test(&mut self, kind: EventKind, test: TestEvent) -> Option<TestRecord> {
        let key = test.key();

        if kind.is_start() {
            if !self.records.contains_key(&key) {
                self.order.push(key.clone());
            }
            let record = TestRecord::new(kind, test);
            self.records.insert(key, record.clone());
            return Some(record);
        }

        let Some(record) = self.records.get_mut(&key) else {
            tracing::warn!(
                kind = kind.command_name(),
                %key,
                "dropping event for a test that never started"
            );
            return None;
        };

        if kind.is_fault() {
            record.kind = kind;
            record.test.merge(test);
            return None;
        }

        if !record.kind.is_fault() {
            record.kind = kind;
        }
        record.test.merge(test);
        Some(record.clone())
    }

    /// Record for a `(name, flowId)` pair.
    pub fn get(&self, name: &str, flow_id: u64) -> Option<&TestRecord> {
        self.records.get(&format!("{name}-{flow_id}"))
    }

    /// All records in the order their tests first started.
    pub fn records(&self) -> Vec<&TestRecord> {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget every record.
    pub fn reset(&mut self) {
        self.records.clear();
        self.order.clear();
    }
}
