//! Core trait for plain-text report line classification.

use regex::Regex;

use crate::event::ParsedEvent;

/// Recognizes one shape of non service-message report line.
///
/// Each classifier is independent: `is_match` only answers whether the line
/// has its shape, and `classify` extracts the fields. Lines can match more
/// than one grammar, so the order classifiers are consulted in is decided by
/// [`super::ClassifierChain`].
pub trait LineClassifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Check if the line has this classifier's shape.
    fn is_match(&self, line: &str) -> bool;

    /// Extract the structured event, or `None` if the line does not match.
    fn classify(&self, line: &str) -> Option<ParsedEvent>;
}

/// Compile a grammar, logging instead of failing on a bad pattern.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(%pattern, error = %e, "invalid output pattern");
            None
        }
    }
}
