#![forbid(unsafe_code)]

use std::io;

use backtrack_core::{ConfigError, HistoryError};

pub const EXIT_SCRIPT_ERROR: i32 = 2;
pub const EXIT_CONFIG_ERROR: i32 = 3;
pub const EXIT_HISTORY_ERROR: i32 = 4;
pub const EXIT_IO_ERROR: i32 = 5;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Script { .. } => EXIT_SCRIPT_ERROR,
            Self::Config(_) => EXIT_CONFIG_ERROR,
            Self::History(_) => EXIT_HISTORY_ERROR,
            Self::Io(_) => EXIT_IO_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            CliError::script(3, "unknown command"),
            CliError::Config(ConfigError::InvalidCapacity(0)),
            CliError::History(HistoryError::NothingToUndo),
            CliError::Io(io::Error::other("closed")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(CliError::exit_code).collect();
        codes.dedup();
        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn script_error_names_the_line() {
        let err = CliError::script(7, "unknown command `jump`");
        assert_eq!(err.to_string(), "line 7: unknown command `jump`");
    }
}
