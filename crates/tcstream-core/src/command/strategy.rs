//! Local and remote execution strategies.

use regex::Regex;

use crate::config::RunnerConfig;
use crate::path::PathTranslator;

/// Command prefixes that run the tests somewhere else.
pub const REMOTE_COMMAND_PATTERN: &str = r"docker|ssh|sail";

/// How a command reaches the test process.
///
/// The local strategy runs the runner directly in the workspace. The remote
/// strategy goes through a prefix such as `docker compose exec app`, so
/// paths need mapping and the runner invocation travels as one shell string.
pub trait ExecutionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Translator for paths crossing the execution boundary.
    fn path_translator(&self, cwd: &str, config: &RunnerConfig) -> PathTranslator;

    /// Final shape of the runner invocation placed after the command prefix.
    fn format_arguments(&self, invocation: Vec<String>) -> Vec<String>;
}

/// Runs the runner on this machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalExecution;

impl ExecutionStrategy for LocalExecution {
    fn name(&self) -> &'static str {
        "local"
    }

    fn path_translator(&self, cwd: &str, _config: &RunnerConfig) -> PathTranslator {
        PathTranslator::new(cwd)
    }

    fn format_arguments(&self, invocation: Vec<String>) -> Vec<String> {
        invocation
    }
}

/// Runs the runner through a container or remote shell prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteExecution;

impl ExecutionStrategy for RemoteExecution {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn path_translator(&self, cwd: &str, config: &RunnerConfig) -> PathTranslator {
        PathTranslator::with_mapping(cwd, &config.paths)
    }

    fn format_arguments(&self, invocation: Vec<String>) -> Vec<String> {
        let joined = invocation
            .into_iter()
            .filter(|arg| !arg.is_empty())
            .map(|arg| {
                if arg.starts_with('-') {
                    format!("'{arg}'")
                } else {
                    shell_words::quote(&arg).into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        vec![joined]
    }
}

/// Check if a command prefix sends the tests to another environment.
pub fn is_remote_command(command: &str) -> bool {
    Regex::new(REMOTE_COMMAND_PATTERN).is_ok_and(|re| re.is_match(command))
}

/// Pick the strategy matching the configured command prefix.
pub fn select_strategy(command: &str) -> Box<dyn ExecutionStrategy> {
    if is_remote_command(command) {
        Box::new(RemoteExecution)
    } else {
        Box::new(LocalExecution)
    }
}
