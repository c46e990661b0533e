//! Runner command assembly.
//!
//! Turns the runner configuration, a user argument string and a target into
//! a [`CommandSpec`] ready for a process-execution collaborator. The engine
//! never spawns anything itself.

mod error;
mod strategy;

pub use error::CommandError;
pub use strategy::{
    is_remote_command, select_strategy, ExecutionStrategy, LocalExecution, RemoteExecution,
    REMOTE_COMMAND_PATTERN,
};

use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;
use crate::event::ParsedEvent;
use crate::path::PathTranslator;
use crate::session::RunSession;
use crate::tokenizer::{parse_arguments, ArgValue, ArgumentSet};

/// Test ids starting with this prefix run through Codeception.
pub const FUNCTIONAL_TARGET_PREFIX: &str = "functional-unit";

/// Flags the assembler always controls.
pub const DENIED_FLAGS: &[&str] = &["teamcity", "colors", "no-colors", "testdox"];

/// Which runner binary executes a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    PhpUnit,
    Codeception,
}

impl RunnerKind {
    /// Pick the runner from the target's test id.
    pub fn for_target(test_id: &str) -> RunnerKind {
        if test_id.starts_with(FUNCTIONAL_TARGET_PREFIX) {
            RunnerKind::Codeception
        } else {
            RunnerKind::PhpUnit
        }
    }

    /// Flags appended after the user's arguments.
    fn forced_flags(&self) -> [&'static str; 2] {
        match self {
            RunnerKind::PhpUnit => ["--colors=never", "--teamcity"],
            RunnerKind::Codeception => ["--no-colors", "--no-artifacts"],
        }
    }
}

impl std::fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerKind::PhpUnit => write!(f, "phpunit"),
            RunnerKind::Codeception => write!(f, "codecept"),
        }
    }
}

/// A resolved command, one per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    pub executable: String,
    pub arguments: Vec<String>,
    pub working_directory: String,
}

/// A test file, optionally narrowed to one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTarget {
    pub file: String,
    pub method: Option<String>,
}

impl TestTarget {
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            method: None,
        }
    }

    pub fn method(file: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            method: Some(method.into()),
        }
    }

    /// Argument string selecting this target for `kind`.
    ///
    /// PHPUnit narrows with a `--filter` that also matches data-set
    /// variants; Codeception takes `file:method`.
    pub fn arguments(&self, kind: RunnerKind) -> String {
        let Some(method) = self.method.as_deref() else {
            return shell_words::quote(&self.file).into_owned();
        };

        match kind {
            RunnerKind::PhpUnit => {
                let filter = format!("^.*::({method})( with data set .*)?$");
                shell_words::join([self.file.as_str(), "--filter", filter.as_str()])
            }
            RunnerKind::Codeception => {
                shell_words::quote(&format!("{}:{method}", self.file)).into_owned()
            }
        }
    }
}

/// Builds runner commands for one working directory.
///
/// The execution strategy and its path translator are fixed at
/// construction, so every command and every session created from one
/// assembler shares the same mapping.
pub struct CommandAssembler {
    config: RunnerConfig,
    cwd: String,
    debug: bool,
    strategy: Box<dyn ExecutionStrategy>,
    translator: PathTranslator,
}

impl CommandAssembler {
    pub fn new(config: RunnerConfig, cwd: impl Into<String>, debug: bool) -> Self {
        let cwd = cwd.into();
        let strategy = select_strategy(&config.command);
        let translator = strategy.path_translator(&cwd, &config);

        Self {
            config,
            cwd,
            debug,
            strategy,
            translator,
        }
    }

    /// Check if commands go through a container or remote shell.
    pub fn is_remote(&self) -> bool {
        self.strategy.name() == "remote"
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// Build the command running `arguments` for the target `test_id`.
    pub fn build(&self, arguments: &str, test_id: &str) -> Result<CommandSpec, CommandError> {
        let kind = RunnerKind::for_target(test_id);
        let binary = match kind {
            RunnerKind::PhpUnit => &self.config.phpunit,
            RunnerKind::Codeception => &self.config.codecept,
        };
        if binary.trim().is_empty() {
            return Err(CommandError::MissingBinary(kind));
        }

        let mut invocation = vec![self.config.php.clone()];
        invocation.extend(self.php_options().iter().cloned());
        invocation.push(binary.clone());
        if kind == RunnerKind::Codeception {
            invocation.push("run".to_string());
            invocation.push(self.config.codecept_suite.clone());
        }
        invocation.extend(self.runner_arguments(kind, arguments)?);

        if self.is_paratest_functional(&invocation) {
            invocation.push("-f".to_string());
        }

        let prefix = shell_words::split(&self.config.command)
            .map_err(|e| CommandError::invalid_arguments(&self.config.command, e))?;

        let mut tokens = prefix
            .into_iter()
            .chain(self.strategy.format_arguments(invocation))
            .filter(|token| !token.is_empty())
            .map(|token| self.translator.replace_workspace_folder(&token));

        let executable = tokens.next().ok_or(CommandError::EmptyCommand)?;
        let spec = CommandSpec {
            executable,
            arguments: tokens.collect(),
            working_directory: self.cwd.clone(),
        };

        tracing::debug!(
            strategy = self.strategy.name(),
            runner = %kind,
            executable = %spec.executable,
            arguments = ?spec.arguments,
            "assembled runner command"
        );

        Ok(spec)
    }

    /// Rewrite paths in an event reported by the runner into the workspace.
    pub fn translate(&self, mut event: ParsedEvent) -> ParsedEvent {
        self.translator.translate_event(&mut event);
        event
    }

    /// Fresh session for the output of one command.
    pub fn session(&self) -> RunSession {
        RunSession::new(self.translator.clone())
    }

    fn php_options(&self) -> &[String] {
        if self.debug {
            &self.config.php_debug_options
        } else {
            &self.config.php_options
        }
    }

    /// User and configured arguments, filtered, translated and followed by
    /// the forced flags.
    fn runner_arguments(&self, kind: RunnerKind, arguments: &str) -> Result<Vec<String>, CommandError> {
        let input = [arguments.trim().to_string(), shell_words::join(&self.config.args)]
            .join(" ")
            .trim()
            .to_string();
        let parsed = parse_arguments(&input).map_err(|e| CommandError::invalid_arguments(&input, e))?;
        let parsed = normalize_aliases(parsed);

        let has_config = parsed.has("configuration") || parsed.has("config");

        let mut args: Vec<String> = parsed
            .options
            .iter()
            .filter(|(key, _)| !DENIED_FLAGS.contains(&key.as_str()))
            .flat_map(|(key, value)| format_option(key, value))
            .chain(parsed.positional.iter().map(|p| percent_decode(p)))
            .map(|arg| match kind {
                RunnerKind::PhpUnit => self.translator.local_to_remote(&arg),
                RunnerKind::Codeception => self.translator.absolute_to_relative(&arg),
            })
            .collect();

        args.extend(kind.forced_flags().iter().map(|flag| flag.to_string()));

        if !has_config {
            args.push(match kind {
                RunnerKind::PhpUnit => format!("--configuration={}", self.config.phpunit_config),
                RunnerKind::Codeception => format!("--config={}", self.config.codecept_config),
            });
        }

        Ok(args)
    }

    fn is_paratest_functional(&self, invocation: &[String]) -> bool {
        self.config.phpunit.contains("paratest") && invocation.iter().any(|arg| arg.contains("--filter"))
    }
}

fn normalize_aliases(mut args: ArgumentSet) -> ArgumentSet {
    for (key, _) in args.options.iter_mut() {
        if key == "c" {
            *key = "configuration".to_string();
        }
    }
    args
}

fn format_option(key: &str, value: &ArgValue) -> Vec<String> {
    let short = key.chars().count() == 1;
    match (short, value) {
        (true, ArgValue::Flag) => vec![format!("-{key}")],
        (true, ArgValue::Value(v)) => vec![format!("-{key}"), v.clone()],
        (false, ArgValue::Flag) => vec![format!("--{key}")],
        (false, ArgValue::Value(v)) => vec![format!("--{key}={v}")],
    }
}

fn percent_decode(value: &str) -> String {
    percent_encoding::percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
