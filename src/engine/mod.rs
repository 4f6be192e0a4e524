pub mod ghostscript;

use crate::error::ProcessError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub use ghostscript::GhostscriptRunner;

/// Runs the rendering engine with a prepared argument vector.
///
/// Implementations return `Ok` for any process that ran to completion,
/// whatever its exit status; classifying the status is the caller's job.
pub trait ProcessRunner {
    fn run(&self, args: &[String], ctl: &RunControl) -> Result<ExecutionOutcome, ProcessError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, args: &[String], ctl: &RunControl) -> Result<ExecutionOutcome, ProcessError> {
        (**self).run(args, ctl)
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for Arc<R> {
    fn run(&self, args: &[String], ctl: &RunControl) -> Result<ExecutionOutcome, ProcessError> {
        (**self).run(args, ctl)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutcome {
    pub fn from_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            success: code == 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Bounds on a single engine run.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub timeout: Option<Duration>,
    pub cancel: CancelToken,
}

impl RunControl {
    pub fn new(timeout: Option<Duration>, cancel: CancelToken) -> Self {
        Self { timeout, cancel }
    }
}

/// Shared flag asking an in-flight run to kill its process.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
