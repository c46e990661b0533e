//! Protocol engine for PHPUnit and Codeception TeamCity output.
//!
//! Raw runner output goes through [`EventParser`] line by line, lifecycle
//! events are folded per test by [`TestCorrelator`], and paths are rewritten
//! between the workspace and the runner's filesystem by [`PathTranslator`].
//! [`CommandAssembler`] builds the command whose output a [`RunSession`]
//! then consumes.

pub mod classifier;
pub mod command;
pub mod config;
pub mod correlator;
pub mod diagnostic;
pub mod escape;
pub mod event;
pub mod parser;
pub mod path;
pub mod session;
pub mod status;
pub mod tokenizer;

pub use classifier::{ClassifierChain, LineClassifier};
pub use command::{CommandAssembler, CommandError, CommandSpec, RunnerKind, TestTarget};
pub use config::{Config, ConfigError, RunnerConfig};
pub use correlator::TestCorrelator;
pub use diagnostic::{Diagnostic, Severity};
pub use event::{Detail, EventKind, ParsedEvent, ResultSummary, TestEvent, TestRecord};
pub use parser::EventParser;
pub use path::{PathMapping, PathTranslator};
pub use session::RunSession;
pub use status::TestStatus;
