use thiserror::Error;

use super::RunnerKind;

/// Errors that can occur while assembling a runner command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No {0} binary configured")]
    MissingBinary(RunnerKind),

    #[error("Invalid arguments '{input}': {source}")]
    InvalidArguments {
        input: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("Assembled command is empty")]
    EmptyCommand,
}

impl CommandError {
    pub fn invalid_arguments(input: impl Into<String>, source: shell_words::ParseError) -> Self {
        CommandError::InvalidArguments {
            input: input.into(),
            source,
        }
    }
}
