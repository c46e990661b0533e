//! Per-execution output processing.

use crate::correlator::TestCorrelator;
use crate::diagnostic::{self, Diagnostic};
use crate::event::{ParsedEvent, ResultSummary, TestRecord};
use crate::parser::EventParser;
use crate::path::PathTranslator;

/// Owns everything one command execution needs to turn raw output into
/// events: the parser, the correlator and the path translator.
///
/// Output arrives in arbitrary chunks; partial lines are buffered until
/// their newline shows up or [`RunSession::finish`] is called. Drop the
/// session to start over.
pub struct RunSession {
    parser: EventParser,
    correlator: TestCorrelator,
    translator: PathTranslator,
    buffer: Vec<u8>,
    summary: Option<ResultSummary>,
}

impl RunSession {
    pub fn new(translator: PathTranslator) -> Self {
        Self::with_parser(EventParser::new(), translator)
    }

    pub fn with_parser(parser: EventParser, translator: PathTranslator) -> Self {
        Self {
            parser,
            correlator: TestCorrelator::new(),
            translator,
            buffer: Vec::new(),
            summary: None,
        }
    }

    /// Feed a chunk of output and return the events of every completed line.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<ParsedEvent> {
        self.push_bytes(chunk.as_bytes())
    }

    /// Feed raw process output.
    ///
    /// Bytes are buffered up to each `\n` and every complete line is decoded
    /// lossily, so invalid UTF-8 and multi-byte characters split across
    /// chunks never stop the stream.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<ParsedEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            events.extend(self.push_line(&String::from_utf8_lossy(&line)));
        }
        events
    }

    /// Process one complete line.
    ///
    /// Paths are translated before correlation so records always hold
    /// workspace paths.
    pub fn push_line(&mut self, line: &str) -> Option<ParsedEvent> {
        let mut event = self.parser.parse(line)?;
        self.translator.translate_event(&mut event);

        if let ParsedEvent::ResultSummary(summary) = &event {
            self.summary = Some(summary.clone());
        }

        self.correlator.apply(event)
    }

    /// Flush a trailing line that never got its newline.
    pub fn finish(&mut self) -> Vec<ParsedEvent> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.push_line(&String::from_utf8_lossy(&line))
            .into_iter()
            .collect()
    }

    /// Records in the order their tests started.
    pub fn records(&self) -> Vec<&TestRecord> {
        self.correlator.records()
    }

    pub fn correlator(&self) -> &TestCorrelator {
        &self.correlator
    }

    /// Last result summary line seen, if any.
    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        diagnostic::collect(self.correlator.records())
    }
}
