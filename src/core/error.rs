use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when the interpreter cannot be found (shell `exec` convention).
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit status used when the interpreter exists but cannot be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Cannot change directory to {}: {reason}", path.display())]
    ChangeDir { path: PathBuf, reason: String },

    #[error("Environment activation failed: {0}")]
    Activation(String),

    #[error("{0}: command not found")]
    InterpreterNotFound(String),

    #[error("{}: permission denied", .0.display())]
    NotExecutable(PathBuf),

    #[error("Hand-off to entry point failed: {0}")]
    Handoff(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LauncherError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::InterpreterNotFound(_) => EXIT_NOT_FOUND,
            LauncherError::NotExecutable(_) => EXIT_NOT_EXECUTABLE,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
