use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command `{0}` timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Command `{command}` did not produce {}", .path.display())]
    MissingOutput { command: String, path: PathBuf },
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("Empty command line for {0}")]
    EmptyCommand(&'static str),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
