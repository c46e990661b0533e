//! Ordered set of line classifiers.

use std::sync::Arc;

use super::lines::{PatternClassifier, ResultSummaryClassifier};
use super::traits::LineClassifier;
use crate::event::ParsedEvent;

/// Classifiers consulted in a fixed priority order; the first match wins.
///
/// The built-in order is part of the contract because a line can fit more
/// than one grammar:
///
/// 1. tool version
/// 2. runtime
/// 3. configuration
/// 4. processes
/// 5. time and memory
/// 6. result summary
pub struct ClassifierChain {
    classifiers: Vec<Arc<dyn LineClassifier>>,
}

impl ClassifierChain {
    /// Create a chain with all built-in classifiers in priority order.
    pub fn new() -> Self {
        let mut chain = Self::empty();

        chain.push(Arc::new(PatternClassifier::version()));
        chain.push(Arc::new(PatternClassifier::runtime()));
        chain.push(Arc::new(PatternClassifier::configuration()));
        chain.push(Arc::new(PatternClassifier::processes()));
        chain.push(Arc::new(PatternClassifier::time_and_memory()));
        chain.push(Arc::new(ResultSummaryClassifier::new()));

        chain
    }

    /// Create a chain without any classifier.
    pub fn empty() -> Self {
        Self {
            classifiers: Vec::new(),
        }
    }

    /// Append a classifier with the lowest priority.
    pub fn push(&mut self, classifier: Arc<dyn LineClassifier>) {
        self.classifiers.push(classifier);
    }

    /// Classify `line` with the first classifier whose shape it has.
    pub fn classify(&self, line: &str) -> Option<ParsedEvent> {
        let classifier = self.classifiers.iter().find(|c| c.is_match(line))?;
        let event = classifier.classify(line);
        if event.is_some() {
            tracing::trace!(classifier = classifier.name(), "classified report line");
        }
        event
    }

    /// Names of the registered classifiers in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::new()
    }
}
