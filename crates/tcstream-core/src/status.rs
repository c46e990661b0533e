use serde::{Deserialize, Serialize};

/// Outcome category of a test, as used by summaries and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Started but not finished yet.
    #[default]
    Unknown,
    Passed,
    Skipped,
    Incomplete,
    Failure,
    Error,
    Risky,
    Warning,
}

impl TestStatus {
    /// Map a runner label to a status.
    ///
    /// Matching ignores case and accepts plural forms (`Failures`, `errors`).
    /// Anything unrecognized maps to [`TestStatus::Error`].
    pub fn from_label(label: &str) -> TestStatus {
        let label = label.trim().to_ascii_lowercase();
        let singular = label
            .strip_suffix("es")
            .filter(|s| s.ends_with("ss"))
            .or_else(|| label.strip_suffix('s'))
            .unwrap_or(&label);

        Self::lookup(&label)
            .or_else(|| Self::lookup(singular))
            .unwrap_or(TestStatus::Error)
    }

    fn lookup(label: &str) -> Option<TestStatus> {
        match label {
            "unknown" => Some(TestStatus::Unknown),
            "passed" | "pass" | "ok" => Some(TestStatus::Passed),
            "skipped" | "skip" => Some(TestStatus::Skipped),
            "incomplete" => Some(TestStatus::Incomplete),
            "failure" | "failed" => Some(TestStatus::Failure),
            "error" => Some(TestStatus::Error),
            "risky" => Some(TestStatus::Risky),
            "warning" => Some(TestStatus::Warning),
            _ => None,
        }
    }

    /// Returns a human-readable name for the status.
    pub fn display_name(&self) -> &'static str {
        match self {
            TestStatus::Unknown => "Unknown",
            TestStatus::Passed => "Passed",
            TestStatus::Skipped => "Skipped",
            TestStatus::Incomplete => "Incomplete",
            TestStatus::Failure => "Failure",
            TestStatus::Error => "Error",
            TestStatus::Risky => "Risky",
            TestStatus::Warning => "Warning",
        }
    }

    /// True for outcomes that should surface as a problem.
    pub fn is_problem(&self) -> bool {
        !matches!(self, TestStatus::Unknown | TestStatus::Passed)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_known() {
        assert_eq!(TestStatus::from_label("PASSED"), TestStatus::Passed);
        assert_eq!(TestStatus::from_label("skipped"), TestStatus::Skipped);
        assert_eq!(TestStatus::from_label("Incomplete"), TestStatus::Incomplete);
        assert_eq!(TestStatus::from_label("Failures"), TestStatus::Failure);
        assert_eq!(TestStatus::from_label("errors"), TestStatus::Error);
        assert_eq!(TestStatus::from_label("Risky"), TestStatus::Risky);
        assert_eq!(TestStatus::from_label("warnings"), TestStatus::Warning);
    }

    #[test]
    fn test_from_label_falls_back_to_error() {
        assert_eq!(TestStatus::from_label("deprecations"), TestStatus::Error);
        assert_eq!(TestStatus::from_label(""), TestStatus::Error);
    }

    #[test]
    fn test_is_problem() {
        assert!(!TestStatus::Passed.is_problem());
        assert!(!TestStatus::Unknown.is_problem());
        assert!(TestStatus::Skipped.is_problem());
        assert!(TestStatus::Error.is_problem());
    }
}
