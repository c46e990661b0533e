//! Typed events produced from runner output.

use serde::{Deserialize, Serialize};

use crate::status::TestStatus;

/// Lifecycle message kinds understood by the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    SuiteStarted,
    SuiteFinished,
    TestStarted,
    TestFinished,
    TestFailed,
    TestIgnored,
}

impl EventKind {
    /// Map a service-message command name (`testSuiteStarted`, ...) to a kind.
    pub fn from_command(command: &str) -> Option<EventKind> {
        match command {
            "testSuiteStarted" => Some(EventKind::SuiteStarted),
            "testSuiteFinished" => Some(EventKind::SuiteFinished),
            "testStarted" => Some(EventKind::TestStarted),
            "testFinished" => Some(EventKind::TestFinished),
            "testFailed" => Some(EventKind::TestFailed),
            "testIgnored" => Some(EventKind::TestIgnored),
            _ => None,
        }
    }

    /// The service-message command name for this kind.
    pub fn command_name(&self) -> &'static str {
        match self {
            EventKind::SuiteStarted => "testSuiteStarted",
            EventKind::SuiteFinished => "testSuiteFinished",
            EventKind::TestStarted => "testStarted",
            EventKind::TestFinished => "testFinished",
            EventKind::TestFailed => "testFailed",
            EventKind::TestIgnored => "testIgnored",
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, EventKind::SuiteStarted | EventKind::TestStarted)
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, EventKind::SuiteFinished | EventKind::TestFinished)
    }

    /// Failed and ignored tests are fault kinds; a finish never replaces them.
    pub fn is_fault(&self) -> bool {
        matches!(self, EventKind::TestFailed | EventKind::TestIgnored)
    }
}

/// A `file:line` location reported with a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub file: String,
    pub line: u32,
}

/// Fields shared by every lifecycle message.
///
/// Optional fields are only set when the message carried them, which lets
/// [`TestEvent::merge`] overlay a later message onto an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEvent {
    pub name: String,
    pub flow_id: u64,

    /// Qualified test path from the location hint, e.g. `Foo\BarTest::testBaz`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `<suite>.<id>` with any data-set suffix removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Detail>>,

    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// Failure type, e.g. `comparisonFailure`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl TestEvent {
    pub fn new(name: impl Into<String>, flow_id: u64) -> Self {
        Self {
            name: name.into(),
            flow_id,
            ..Default::default()
        }
    }

    /// Correlation key: `<name>-<flowId>`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.name, self.flow_id)
    }

    /// Overlay every field `other` carries onto `self`.
    pub fn merge(&mut self, other: TestEvent) {
        self.name = other.name;
        self.flow_id = other.flow_id;

        overlay(&mut self.id, other.id);
        overlay(&mut self.test_id, other.test_id);
        overlay(&mut self.file, other.file);
        overlay(&mut self.location_hint, other.location_hint);
        overlay(&mut self.message, other.message);
        overlay(&mut self.details, other.details);
        overlay(&mut self.duration, other.duration);
        overlay(&mut self.failure_type, other.failure_type);
        overlay(&mut self.actual, other.actual);
        overlay(&mut self.expected, other.expected);
    }
}

fn overlay<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// The correlator's unit: one record per `(name, flowId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub kind: EventKind,
    #[serde(flatten)]
    pub test: TestEvent,
}

impl TestRecord {
    pub fn new(kind: EventKind, test: TestEvent) -> Self {
        Self { kind, test }
    }

    pub fn key(&self) -> String {
        self.test.key()
    }

    /// Outcome implied by the record's kind and message.
    pub fn status(&self) -> TestStatus {
        match self.kind {
            EventKind::SuiteStarted | EventKind::TestStarted => TestStatus::Unknown,
            EventKind::SuiteFinished | EventKind::TestFinished => TestStatus::Passed,
            EventKind::TestFailed if self.is_uncaught_throwable() => TestStatus::Error,
            EventKind::TestFailed => TestStatus::Failure,
            EventKind::TestIgnored => {
                let message = self
                    .test
                    .message
                    .as_deref()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if message.contains("incomplete") {
                    TestStatus::Incomplete
                } else if message.contains("risky") {
                    TestStatus::Risky
                } else {
                    TestStatus::Skipped
                }
            }
        }
    }

    /// A failure without a comparison type whose message starts with a
    /// throwable class, e.g. `Error: Call to undefined function foo()` or
    /// `App\Exception\NotFoundException: missing`. PHPUnit's own
    /// assertion exceptions are failures.
    fn is_uncaught_throwable(&self) -> bool {
        if self.test.failure_type.is_some() {
            return false;
        }

        let Some((class, _)) = self
            .test
            .message
            .as_deref()
            .and_then(|m| m.trim_start().split_once(':'))
        else {
            return false;
        };

        let is_class_name = !class.is_empty()
            && class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\');

        is_class_name
            && (class.ends_with("Error") || class.ends_with("Exception"))
            && !class.trim_start_matches('\\').starts_with("PHPUnit\\")
    }

    /// Convert back into the event the record currently represents.
    pub fn into_event(self) -> ParsedEvent {
        ParsedEvent::lifecycle(self.kind, self.test)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCount {
    pub count: u64,
    pub flow_id: u64,
}

/// `PHPUnit 10.5.2 by Sebastian Bergmann and contributors.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersion {
    pub tool: String,
    pub version: String,
}

/// `Runtime:       PHP 8.2.13`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub runtime: String,
}

/// `Configuration: /app/phpunit.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub path: String,
}

/// `Processes:     4`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCount {
    pub processes: u32,
}

/// `Time: 00:00.049, Memory: 6.00 MB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAndMemory {
    pub time: String,
    pub memory: String,
}

/// Final counts line. Only the categories present in the line are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failures: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risky: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notices: Option<u32>,
}

impl ResultSummary {
    /// Set a count by its lower-cased label. Unknown labels are ignored.
    pub fn set(&mut self, label: &str, count: u32) -> bool {
        let slot = match label {
            "tests" => &mut self.tests,
            "assertions" => &mut self.assertions,
            "errors" => &mut self.errors,
            "failures" => &mut self.failures,
            "warnings" => &mut self.warnings,
            "skipped" => &mut self.skipped,
            "incomplete" => &mut self.incomplete,
            "risky" => &mut self.risky,
            "deprecations" => &mut self.deprecations,
            "notices" => &mut self.notices,
            _ => return false,
        };
        *slot = Some(count);
        true
    }

    /// Non-zero problem categories with their status.
    pub fn problems(&self) -> Vec<(TestStatus, u32)> {
        [
            ("errors", self.errors),
            ("failures", self.failures),
            ("warnings", self.warnings),
            ("skipped", self.skipped),
            ("incomplete", self.incomplete),
            ("risky", self.risky),
        ]
        .into_iter()
        .filter_map(|(label, count)| match count {
            Some(n) if n > 0 => Some((TestStatus::from_label(label), n)),
            _ => None,
        })
        .collect()
    }

    /// True when no error or failure was counted.
    pub fn is_successful(&self) -> bool {
        self.errors.unwrap_or(0) == 0 && self.failures.unwrap_or(0) == 0
    }
}

/// One structured item recognized in runner output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ParsedEvent {
    SuiteStarted(TestEvent),
    SuiteFinished(TestEvent),
    TestStarted(TestEvent),
    TestFinished(TestEvent),
    TestFailed(TestEvent),
    TestIgnored(TestEvent),
    TestCount(TestCount),
    ToolVersion(ToolVersion),
    RuntimeInfo(RuntimeInfo),
    RunConfiguration(RunConfiguration),
    ProcessCount(ProcessCount),
    TimeAndMemory(TimeAndMemory),
    ResultSummary(ResultSummary),
}

impl ParsedEvent {
    /// Build the lifecycle variant matching `kind`.
    pub fn lifecycle(kind: EventKind, test: TestEvent) -> ParsedEvent {
        match kind {
            EventKind::SuiteStarted => ParsedEvent::SuiteStarted(test),
            EventKind::SuiteFinished => ParsedEvent::SuiteFinished(test),
            EventKind::TestStarted => ParsedEvent::TestStarted(test),
            EventKind::TestFinished => ParsedEvent::TestFinished(test),
            EventKind::TestFailed => ParsedEvent::TestFailed(test),
            EventKind::TestIgnored => ParsedEvent::TestIgnored(test),
        }
    }

    /// Lifecycle kind and fields, if this is a lifecycle event.
    pub fn as_lifecycle(&self) -> Option<(EventKind, &TestEvent)> {
        match self {
            ParsedEvent::SuiteStarted(t) => Some((EventKind::SuiteStarted, t)),
            ParsedEvent::SuiteFinished(t) => Some((EventKind::SuiteFinished, t)),
            ParsedEvent::TestStarted(t) => Some((EventKind::TestStarted, t)),
            ParsedEvent::TestFinished(t) => Some((EventKind::TestFinished, t)),
            ParsedEvent::TestFailed(t) => Some((EventKind::TestFailed, t)),
            ParsedEvent::TestIgnored(t) => Some((EventKind::TestIgnored, t)),
            _ => None,
        }
    }

    pub fn as_lifecycle_mut(&mut self) -> Option<&mut TestEvent> {
        match self {
            ParsedEvent::SuiteStarted(t)
            | ParsedEvent::SuiteFinished(t)
            | ParsedEvent::TestStarted(t)
            | ParsedEvent::TestFinished(t)
            | ParsedEvent::TestFailed(t)
            | ParsedEvent::TestIgnored(t) => Some(t),
            _ => None,
        }
    }

    /// Split into kind and fields, or hand the event back unchanged.
    pub fn into_lifecycle(self) -> Result<(EventKind, TestEvent), ParsedEvent> {
        match self {
            ParsedEvent::SuiteStarted(t) => Ok((EventKind::SuiteStarted, t)),
            ParsedEvent::SuiteFinished(t) => Ok((EventKind::SuiteFinished, t)),
            ParsedEvent::TestStarted(t) => Ok((EventKind::TestStarted, t)),
            ParsedEvent::TestFinished(t) => Ok((EventKind::TestFinished, t)),
            ParsedEvent::TestFailed(t) => Ok((EventKind::TestFailed, t)),
            ParsedEvent::TestIgnored(t) => Ok((EventKind::TestIgnored, t)),
            other => Err(other),
        }
    }

    /// Short name of the variant, matching its serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            ParsedEvent::SuiteStarted(_) => "suiteStarted",
            ParsedEvent::SuiteFinished(_) => "suiteFinished",
            ParsedEvent::TestStarted(_) => "testStarted",
            ParsedEvent::TestFinished(_) => "testFinished",
            ParsedEvent::TestFailed(_) => "testFailed",
            ParsedEvent::TestIgnored(_) => "testIgnored",
            ParsedEvent::TestCount(_) => "testCount",
            ParsedEvent::ToolVersion(_) => "toolVersion",
            ParsedEvent::RuntimeInfo(_) => "runtimeInfo",
            ParsedEvent::RunConfiguration(_) => "runConfiguration",
            ParsedEvent::ProcessCount(_) => "processCount",
            ParsedEvent::TimeAndMemory(_) => "timeAndMemory",
            ParsedEvent::ResultSummary(_) => "resultSummary",
        }
    }
}
