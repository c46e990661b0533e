//! Built-in line classifiers.

use regex::{Captures, Regex};

use super::patterns::{
    summary_pattern, CONFIGURATION_PATTERN, PROCESSES_PATTERN, RUNTIME_PATTERN,
    SUMMARY_ITEM_PATTERN, SUMMARY_OK_PATTERN, TIME_AND_MEMORY_PATTERN, VERSION_PATTERN,
};
use super::traits::{compile, LineClassifier};
use crate::event::{
    ParsedEvent, ProcessCount, ResultSummary, RunConfiguration, RuntimeInfo, TimeAndMemory,
    ToolVersion,
};

type Extractor = fn(&Captures<'_>) -> Option<ParsedEvent>;

/// A single-regex classifier paired with its field extractor.
pub struct PatternClassifier {
    name: &'static str,
    pattern: Option<Regex>,
    extract: Extractor,
}

impl PatternClassifier {
    pub fn new(name: &'static str, pattern: &str, extract: Extractor) -> Self {
        Self {
            name,
            pattern: compile(pattern),
            extract,
        }
    }

    /// `PHPUnit 10.5.2 by Sebastian Bergmann and contributors.`
    pub fn version() -> Self {
        Self::new("version", VERSION_PATTERN, |cap| {
            Some(ParsedEvent::ToolVersion(ToolVersion {
                tool: group(cap, "tool")?,
                version: group(cap, "version")?.trim_end_matches('.').to_string(),
            }))
        })
    }

    /// `Runtime:       PHP 8.2.13`
    pub fn runtime() -> Self {
        Self::new("runtime", RUNTIME_PATTERN, |cap| {
            Some(ParsedEvent::RuntimeInfo(RuntimeInfo {
                runtime: group(cap, "runtime")?,
            }))
        })
    }

    /// `Configuration: /app/phpunit.xml`
    pub fn configuration() -> Self {
        Self::new("configuration", CONFIGURATION_PATTERN, |cap| {
            Some(ParsedEvent::RunConfiguration(RunConfiguration {
                path: group(cap, "configuration")?,
            }))
        })
    }

    /// `Processes:     4`
    pub fn processes() -> Self {
        Self::new("processes", PROCESSES_PATTERN, |cap| {
            Some(ParsedEvent::ProcessCount(ProcessCount {
                processes: group(cap, "processes")?.parse().ok()?,
            }))
        })
    }

    /// `Time: 00:00.049, Memory: 6.00 MB`
    pub fn time_and_memory() -> Self {
        Self::new("time_and_memory", TIME_AND_MEMORY_PATTERN, |cap| {
            Some(ParsedEvent::TimeAndMemory(TimeAndMemory {
                time: group(cap, "time")?,
                memory: group(cap, "memory")?,
            }))
        })
    }
}

impl LineClassifier for PatternClassifier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_match(&self, line: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(line))
    }

    fn classify(&self, line: &str) -> Option<ParsedEvent> {
        let cap = self.pattern.as_ref()?.captures(line)?;
        (self.extract)(&cap)
    }
}

/// Final summary line, in both the counted and the `OK (...)` form.
pub struct ResultSummaryClassifier {
    summary: Option<Regex>,
    item: Option<Regex>,
    ok: Option<Regex>,
}

impl ResultSummaryClassifier {
    pub fn new() -> Self {
        Self {
            summary: compile(&summary_pattern()),
            item: compile(SUMMARY_ITEM_PATTERN),
            ok: compile(SUMMARY_OK_PATTERN),
        }
    }

    fn classify_counts(&self, line: &str) -> Option<ResultSummary> {
        if !self.summary.as_ref()?.is_match(line) {
            return None;
        }

        let mut summary = ResultSummary::default();
        for cap in self.item.as_ref()?.captures_iter(line) {
            let (Some(name), Some(count)) = (cap.name("name"), cap.name("count")) else {
                continue;
            };
            if let Ok(count) = count.as_str().parse() {
                summary.set(&name.as_str().to_lowercase(), count);
            }
        }

        Some(summary)
    }

    fn classify_ok(&self, line: &str) -> Option<ResultSummary> {
        let cap = self.ok.as_ref()?.captures(line)?;

        Some(ResultSummary {
            tests: group(&cap, "tests")?.parse().ok(),
            assertions: group(&cap, "assertions")?.parse().ok(),
            ..Default::default()
        })
    }
}

impl Default for ResultSummaryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier for ResultSummaryClassifier {
    fn name(&self) -> &'static str {
        "result_summary"
    }

    fn is_match(&self, line: &str) -> bool {
        let matches = |re: &Option<Regex>| re.as_ref().is_some_and(|re| re.is_match(line));
        matches(&self.summary) || matches(&self.ok)
    }

    fn classify(&self, line: &str) -> Option<ParsedEvent> {
        self.classify_counts(line)
            .or_else(|| self.classify_ok(line))
            .map(ParsedEvent::ResultSummary)
    }
}

fn group(cap: &Captures<'_>, name: &str) -> Option<String> {
    cap.name(name).map(|m| m.as_str().to_string())
}
