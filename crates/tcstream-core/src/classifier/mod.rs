//! Classification of plain-text report lines.
//!
//! Runners print a handful of human-readable lines next to their service
//! messages: the tool banner, runtime and configuration lines, the process
//! count of parallel runners, a timing line and the final summary. Each
//! shape is recognized by one [`LineClassifier`]; [`ClassifierChain`] tries
//! them in a fixed order.

mod chain;
mod lines;
mod patterns;
mod traits;

pub use chain::ClassifierChain;
pub use lines::{PatternClassifier, ResultSummaryClassifier};
pub use patterns::SUMMARY_CATEGORIES;
pub use traits::LineClassifier;

pub(crate) use traits::compile;
