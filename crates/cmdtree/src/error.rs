use std::fmt;

use cmdtree_flags::{DeclareError, ParseError};
use thiserror::Error;

/// Errors returned by [`App::run`](crate::App::run).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Two options on the resolved path collide, or an option has no name.
    #[error("invalid declaration on command '{command}': {source}")]
    Declaration {
        command: String,
        #[source]
        source: DeclareError,
    },

    #[error("invalid value for {option}: {error}")]
    Validation { option: String, error: anyhow::Error },

    /// Tokens were left over at a command that has subcommands but no action.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Hook(anyhow::Error),

    #[error(transparent)]
    Action(anyhow::Error),

    /// An action requested a specific exit code.
    #[error("{0}")]
    Exit(Exit),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit(exit) => exit.code(),
            _ => 1,
        }
    }

    /// An exit request that carries no error message.
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, Self::Exit(exit) if exit.error().is_none())
    }

    /// Map a callback error, recognising exit requests.
    pub(crate) fn from_callback(err: anyhow::Error, wrap: fn(anyhow::Error) -> Self) -> Self {
        match err.downcast::<Exit>() {
            Ok(exit) => Self::Exit(exit),
            Err(err) => wrap(err),
        }
    }
}

/// Exit request returned from an action.
///
/// ```rust,ignore
/// Command::new("fail").action(|_| Err(Exit::new(3).into()))
/// ```
#[derive(Debug)]
pub struct Exit {
    code: i32,
    error: Option<anyhow::Error>,
}

impl Exit {
    pub fn new(code: i32) -> Self {
        Self { code, error: None }
    }

    pub fn success() -> Self {
        Self::new(0)
    }

    pub fn with_error(code: i32, error: impl Into<anyhow::Error>) -> Self {
        Self {
            code,
            error: Some(error.into()),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_ref()
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(err) => write!(f, "{err}"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Exit {}

/// What to do when an option validator rejects a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Abort the invocation with the first failure.
    #[default]
    FailFast,
    /// Log failures and keep going.
    Warn,
}
