//! Error handling for the buildsite application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for buildsite operations.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors in the declarative site configuration
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// No declarative configuration where one is mandatory
    #[error("You must provide {0} for this build.")]
    MissingConfiguration(String),

    /// Represents errors rendering the generator settings artifact
    #[error("Settings rendering error: {0}.")]
    RenderError(#[from] minijinja::Error),

    /// A subprocess (git, the generator, pip) exited with a failure
    #[error("Command '{command}' failed: {reason}.")]
    CommandError { command: String, reason: String },

    /// Represents errors during pre-run/post-run script execution
    #[error("Hook execution error: {0}.")]
    HookError(String),

    /// Represents errors reading or rendering a content source file
    #[error("Content error in '{path}': {reason}.")]
    ContentError { path: String, reason: String },

    /// The per-project build lock could not be acquired within the budget
    #[error("Could not acquire lock for project '{project}' - is another build taking ages to complete?!")]
    LockTimeoutError { project: String },

    /// The generator ran to completion but produced too few pages
    #[error("Not enough html pages in the web site: minimum {minimum} > {found} found.")]
    InsufficientOutputError { minimum: usize, found: usize },

    /// Represents errors requesting a remote build
    #[error("Trigger error: {0}.")]
    TriggerError(String),

    /// Represents errors talking to the build-scheduling service
    #[error("HTTP error: {0}.")]
    HttpError(#[from] reqwest::Error),
}

impl BuildError {
    /// Process exit code associated with this error.
    ///
    /// Insufficient output is distinguished from a generator crash (4),
    /// and a lock timeout from everything else (-1).
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::InsufficientOutputError { .. } | BuildError::MissingConfiguration(_) => 4,
            BuildError::LockTimeoutError { .. } => -1,
            _ => 1,
        }
    }
}

/// Convenience type alias for Results with BuildError as the error type.
pub type BuildResult<T> = Result<T, BuildError>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: BuildError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(err.exit_code());
}
