//! Problem records for editor or CI diagnostics.

use serde::{Deserialize, Serialize};

use crate::event::TestRecord;
use crate::status::TestStatus;

/// Source tag attached to every diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "PHPUnit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl From<TestStatus> for Severity {
    fn from(status: TestStatus) -> Self {
        match status {
            TestStatus::Error => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// One problem anchored at a file and 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub message: String,
    pub severity: Severity,
    pub source: String,
}

impl Diagnostic {
    /// Diagnostic for a finished record with a problem status.
    ///
    /// The anchor is the first detail inside the test's own file, falling
    /// back to the first detail. Records without any detail have no usable
    /// line and produce nothing.
    pub fn from_record(record: &TestRecord) -> Option<Diagnostic> {
        let status = record.status();
        if !status.is_problem() {
            return None;
        }

        let details = record.test.details.as_deref().unwrap_or_default();
        let anchor = record
            .test
            .file
            .as_deref()
            .and_then(|file| details.iter().find(|d| d.file == file))
            .or_else(|| details.first())?;

        Some(Diagnostic {
            file: anchor.file.clone(),
            line: anchor.line,
            message: record.test.message.clone().unwrap_or_default(),
            severity: Severity::from(status),
            source: DIAGNOSTIC_SOURCE.to_string(),
        })
    }
}

/// Diagnostics for every problem record, in record order.
pub fn collect<'a>(records: impl IntoIterator<Item = &'a TestRecord>) -> Vec<Diagnostic> {
    records.into_iter().filter_map(Diagnostic::from_record).collect()
}
