//! Unified error types for the pantheon-core library.
//!
//! Uses SNAFU for context-rich error handling, especially useful when the same
//! underlying error type (like `std::io::Error`) appears in different contexts.

use snafu::{ResultExt, Snafu};
use std::path::PathBuf;

use crate::flags::FlagKind;

/// Result type alias using the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all core library operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A path handed to a pantheon command is relative.
    #[snafu(display("path must be absolute: {}", path.display()))]
    NotAbsolutePath { path: PathBuf },

    /// A path that must exist does not.
    #[snafu(display("path does not exist: {}", path.display()))]
    PathMissing { path: PathBuf },

    /// A path that must not exist already does.
    #[snafu(display("path already exists: {}", path.display()))]
    PathAlreadyExists { path: PathBuf },

    /// A required positional argument was not supplied.
    #[snafu(display("command '{command}' requires argument {name}"))]
    MissingArgument { command: String, name: String },

    /// The resolved value of a flag does not fit its declared kind.
    #[snafu(display("unsupported flag type for flag {flag}: {kind:?}"))]
    UnsupportedFlagType { flag: String, kind: FlagKind },

    /// A subcommand name that no schema knows about.
    #[snafu(display("unknown command '{name}'"))]
    UnknownCommand { name: String },

    /// The path of the running executable could not be determined.
    #[snafu(display("failed to get current executable"))]
    ExecutableResolution { source: std::io::Error },

    /// Failed to execute a command.
    #[snafu(display("failed to execute command '{command}'"))]
    CommandExecution {
        command: String,
        source: std::io::Error,
    },

    /// Waiting for a spawned command failed.
    #[snafu(display("failed to wait for command '{command}'"))]
    Wait {
        command: String,
        source: std::io::Error,
    },

    /// Changing the thread signal mask failed.
    #[snafu(display("failed to update signal mask"))]
    SignalMask { source: nix::errno::Errno },

    /// The signal relay thread could not be started.
    #[snafu(display("failed to start signal relay"))]
    SignalRelay { source: std::io::Error },

    /// An environment setting holds a value that cannot be used.
    #[snafu(display("invalid {key}={value:?}: {message}"))]
    InvalidConfig {
        key: String,
        value: String,
        message: String,
    },
}

/// Extension trait for adding context to io::Error results.
pub trait IoResultExt<T> {
    /// Add context for command execution errors.
    fn command_context(self, command: impl Into<String>) -> Result<T>;

    /// Add context for errors while waiting on a command.
    fn wait_context(self, command: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn command_context(self, command: impl Into<String>) -> Result<T> {
        self.context(CommandExecutionSnafu {
            command: command.into(),
        })
    }

    fn wait_context(self, command: impl Into<String>) -> Result<T> {
        self.context(WaitSnafu {
            command: command.into(),
        })
    }
}
