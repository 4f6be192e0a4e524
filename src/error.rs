use crate::request::Operation;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single transcode request.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("unable to locate input file: {path}; ghostscript was unable to {}", Operation::Concatenation)]
    InputNotFound { path: PathBuf },

    #[error("ghostscript was unable to {operation} (exit code {})", fmt_code(.exit_code))]
    ExecutionFailure {
        operation: Operation,
        exit_code: Option<i32>,
        #[source]
        cause: ProcessError,
    },

    #[error("ghostscript was unable to {operation}: path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { operation: Operation, path: PathBuf },

    #[error("ghostscript was unable to {operation}: no output at {}", .destination.display())]
    OutputMissing {
        operation: Operation,
        destination: PathBuf,
    },
}

impl TranscodeError {
    pub fn operation(&self) -> Operation {
        match self {
            Self::InputNotFound { .. } => Operation::Concatenation,
            Self::NonUtf8Path { operation, .. }
            | Self::ExecutionFailure { operation, .. }
            | Self::OutputMissing { operation, .. } => *operation,
        }
    }
}

/// Failure of the engine process itself, independent of the request.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("no ghostscript binary found among candidates: {}", .candidates.join(", "))]
    BinaryNotFound { candidates: Vec<String> },

    #[error("failed to spawn {}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with code {}: {}", fmt_code(.exit_code), .stderr.trim())]
    Exited {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("engine exceeded timeout ({timeout:?}); stderr: {}", .stderr.trim())]
    TimedOut { timeout: Duration, stderr: String },

    #[error("engine run cancelled")]
    Cancelled,

    #[error("i/o error while driving engine: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Exit code reported by the engine, when it got far enough to report one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}
