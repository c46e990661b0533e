//! Per-line dispatcher turning runner output into [`ParsedEvent`]s.

use regex::Regex;

use crate::classifier::{compile, ClassifierChain};
use crate::event::{Detail, EventKind, ParsedEvent, TestCount, TestEvent};
use crate::tokenizer::{tokenize, ServiceMessage};

/// Service-message envelope: `##teamcity[ ... ]`.
const ENVELOPE_PATTERN: &str = r"^\s*#+teamcity\[(?P<payload>.*?)\]?\s*$";

/// A `<file>:<line>` reference inside a message or details block.
const FILE_LINE_PATTERN: &str = r"^\s*(?P<file>.+):(?P<line>\d+)\s*$";

/// Data-set suffix PHPUnit appends to data-provider test names.
const DATA_SET_PATTERN: &str = r#"\swith\sdata\sset\s[#"].+$"#;

/// Scheme of PHPUnit location hints.
pub const LOCATION_HINT_SCHEME: &str = "php_qn://";

/// Stateless line parser.
///
/// Service messages are tried first; any other line goes through the
/// [`ClassifierChain`]. Lines matching nothing are console noise and yield
/// `None`, as do service messages that cannot be tokenized.
pub struct EventParser {
    envelope: Option<Regex>,
    file_line: Option<Regex>,
    data_set: Option<Regex>,
    classifiers: ClassifierChain,
}

impl EventParser {
    pub fn new() -> Self {
        Self::with_classifiers(ClassifierChain::new())
    }

    /// Create a parser using a custom classifier chain.
    pub fn with_classifiers(classifiers: ClassifierChain) -> Self {
        Self {
            envelope: compile(ENVELOPE_PATTERN),
            file_line: compile(FILE_LINE_PATTERN),
            data_set: compile(DATA_SET_PATTERN),
            classifiers,
        }
    }

    /// Check if the line is a service message.
    pub fn is_service_message(&self, line: &str) -> bool {
        self.envelope.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Parse one line of runner output.
    pub fn parse(&self, line: &str) -> Option<ParsedEvent> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(payload) = self.service_payload(line) {
            let event = self.parse_service_message(payload);
            if event.is_none() {
                tracing::trace!(%line, "skipping malformed service message");
            }
            return event;
        }

        let event = self.classifiers.classify(line);
        if event.is_none() && !line.trim().is_empty() {
            tracing::trace!(%line, "skipping unrecognized line");
        }
        event
    }

    fn service_payload<'a>(&self, line: &'a str) -> Option<&'a str> {
        let cap = self.envelope.as_ref()?.captures(line)?;
        cap.name("payload").map(|m| m.as_str())
    }

    fn parse_service_message(&self, payload: &str) -> Option<ParsedEvent> {
        let message = tokenize(payload)?;

        if message.event == "testCount" {
            return Some(ParsedEvent::TestCount(TestCount {
                count: message.get("count")?.trim().parse().ok()?,
                flow_id: parse_flow_id(&message).unwrap_or_default(),
            }));
        }

        let kind = EventKind::from_command(&message.event)?;
        let test = self.build_test_event(&message)?;

        tracing::debug!(kind = kind.command_name(), name = %test.name, flow_id = test.flow_id, "parsed service message");
        Some(ParsedEvent::lifecycle(kind, test))
    }

    fn build_test_event(&self, message: &ServiceMessage) -> Option<TestEvent> {
        let mut test = TestEvent::new(message.get("name")?, parse_flow_id(message)?);

        test.message = message.get("message").map(str::to_string);
        test.duration = message.get("duration").and_then(parse_duration);
        test.failure_type = message.get("type").map(str::to_string);
        test.actual = message.get("actual").map(str::to_string);
        test.expected = message.get("expected").map(str::to_string);

        if let Some(hint) = message.get("locationHint") {
            test.location_hint = Some(hint.to_string());
            let (file, id) = split_location_hint(hint);
            test.test_id = Some(self.test_id(&file, &id));
            test.file = Some(file);
            test.id = Some(id);
        }

        if let Some(details) = message.get("details") {
            let text = test.message.clone().unwrap_or_default();
            let mut found = self.file_lines(&text);

            let mut cleaned = text;
            for detail in &found {
                cleaned = cleaned.replacen(&format!("{}:{}", detail.file, detail.line), "", 1);
            }

            found.extend(self.file_lines(details));
            test.message = Some(cleaned.trim().to_string());
            test.details = Some(found);
        }

        Some(test)
    }

    /// Every line of `text` shaped like `<file>:<line>`.
    fn file_lines(&self, text: &str) -> Vec<Detail> {
        let Some(re) = self.file_line.as_ref() else {
            return Vec::new();
        };

        text.trim()
            .lines()
            .filter_map(|line| {
                let cap = re.captures(line)?;
                let file = cap
                    .name("file")?
                    .as_str()
                    .trim_start()
                    .trim_start_matches('-')
                    .trim();
                let line = cap.name("line")?.as_str().parse().ok()?;
                Some(Detail {
                    file: file.to_string(),
                    line,
                })
            })
            .collect()
    }

    /// `<suite>.<id>` where the suite is the directory directly under `/tests/`.
    fn test_id(&self, file: &str, id: &str) -> String {
        let id = match self.data_set.as_ref() {
            Some(re) => re.replace(id, "").into_owned(),
            None => id.to_string(),
        };

        match suite_of(file) {
            Some(suite) => format!("{suite}.{id}"),
            None => id,
        }
    }
}

impl Default for EventParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `php_qn://<file>::<qualified::path>` into file and qualified id.
pub fn split_location_hint(hint: &str) -> (String, String) {
    let stripped = hint.strip_prefix(LOCATION_HINT_SCHEME).unwrap_or(hint);
    let normalized = stripped.replace("::\\", "::");
    let mut parts = normalized.split("::");

    let file = parts.next().unwrap_or_default().to_string();
    let id = parts.collect::<Vec<_>>().join("::");

    (file, id)
}

fn suite_of(file: &str) -> Option<&str> {
    let rest = match file.split_once("/tests/") {
        Some((_, rest)) => rest,
        None => file.strip_prefix("tests/")?,
    };
    let (suite, _) = rest.split_once('/')?;
    Some(suite).filter(|s| !s.is_empty())
}

fn parse_flow_id(message: &ServiceMessage) -> Option<u64> {
    message.get("flowId")?.trim().parse().ok()
}

fn parse_duration(value: &str) -> Option<u64> {
    let value = value.trim();
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}
