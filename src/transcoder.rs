use crate::{
    command::build_args,
    config::EngineConfig,
    engine::{CancelToken, GhostscriptRunner, ProcessRunner, RunControl},
    error::{ProcessError, TranscodeError},
    request::TranscodeRequest,
    validate::{check_inputs, check_output, check_utf8_paths},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Span, debug, info, info_span, warn};

/// Drives one engine run per request: validate inputs, build the command,
/// execute, then confirm the destination exists.
///
/// Holds no per-request state, so a single instance can be shared between
/// threads as long as callers use distinct destinations.
pub struct Transcoder<R: ProcessRunner> {
    runner: R,
    timeout: Option<Duration>,
    span: Option<Span>,
}

impl Transcoder<GhostscriptRunner> {
    /// Resolves the binary from `cfg` and applies its timeout.
    pub fn from_config(cfg: &EngineConfig) -> Result<Self, ProcessError> {
        let runner = GhostscriptRunner::new(cfg)?;
        Ok(Self::new(runner, cfg.timeout()))
    }
}

impl<R: ProcessRunner> Transcoder<R> {
    pub const NAME: &'static str = "ghostscript-transcoder";

    /// Unless [`with_span`](Self::with_span) is used, each request opens its
    /// own `transcoder` span, so a subscriber installed after construction
    /// still sees it.
    pub fn new(runner: R, timeout: Option<Duration>) -> Self {
        Self {
            runner,
            timeout,
            span: None,
        }
    }

    /// Records every request's events under `span` instead.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn to_image(
        &self,
        input: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Result<&Self, TranscodeError> {
        self.transcode(&TranscodeRequest::to_image(input, destination))?;
        Ok(self)
    }

    /// Extracts `page_quantity` pages starting at the 1-based `page_start`.
    pub fn to_pdf(
        &self,
        input: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        page_start: u32,
        page_quantity: u32,
    ) -> Result<&Self, TranscodeError> {
        self.transcode(&TranscodeRequest::to_pdf(
            input,
            destination,
            page_start,
            page_quantity,
        ))?;
        Ok(self)
    }

    pub fn concatenate_pdfs<I, P>(
        &self,
        inputs: I,
        destination: impl Into<PathBuf>,
    ) -> Result<&Self, TranscodeError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.transcode(&TranscodeRequest::concatenate(inputs, destination))?;
        Ok(self)
    }

    pub fn transcode(&self, req: &TranscodeRequest) -> Result<(), TranscodeError> {
        self.transcode_with_cancel(req, &CancelToken::new())
    }

    pub fn transcode_with_cancel(
        &self,
        req: &TranscodeRequest,
        cancel: &CancelToken,
    ) -> Result<(), TranscodeError> {
        let span = self
            .span
            .clone()
            .unwrap_or_else(|| info_span!("transcoder", engine = Self::NAME));
        let _entered = span.enter();
        let operation = req.operation();
        let destination = req.destination();
        debug!("received {operation} -> {}", destination.display());

        check_utf8_paths(operation, req.paths())?;
        check_inputs(req.required_inputs())?;
        debug!("inputs validated");

        let args = build_args(req);
        debug!(?args, "command built");

        let ctl = RunControl::new(self.timeout, cancel.clone());
        let outcome = self.runner.run(&args, &ctl).map_err(|cause| {
            warn!("{operation} did not complete: {cause}");
            TranscodeError::ExecutionFailure {
                operation,
                exit_code: cause.exit_code(),
                cause,
            }
        })?;

        if !outcome.success {
            warn!("{operation} failed with exit code {:?}", outcome.exit_code);
            return Err(TranscodeError::ExecutionFailure {
                operation,
                exit_code: outcome.exit_code,
                cause: ProcessError::Exited {
                    exit_code: outcome.exit_code,
                    stderr: outcome.stderr,
                },
            });
        }
        debug!("executed");

        check_output(operation, destination)?;
        info!("{operation} ok: {}", destination.display());
        Ok(())
    }
}
