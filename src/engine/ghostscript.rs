use super::{ExecutionOutcome, ProcessRunner, RunControl};
use crate::command::display_command;
use crate::config::EngineConfig;
use crate::error::ProcessError;
use crate::util::expand_tilde;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs a resolved ghostscript binary as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct GhostscriptRunner {
    binary: PathBuf,
    env: BTreeMap<String, String>,
    log_stderr: bool,
}

impl GhostscriptRunner {
    pub fn new(cfg: &EngineConfig) -> Result<Self, ProcessError> {
        let binary = resolve_binary(&cfg.binaries)?;
        debug!("resolved ghostscript binary {}", binary.display());
        Ok(Self {
            binary,
            env: cfg.env.clone(),
            log_stderr: cfg.log_stderr,
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl ProcessRunner for GhostscriptRunner {
    fn run(&self, args: &[String], ctl: &RunControl) -> Result<ExecutionOutcome, ProcessError> {
        if ctl.cancel.is_cancelled() {
            return Err(ProcessError::Cancelled);
        }
        debug!(
            "engine run `{}` timeout={:?}",
            display_command(&self.binary, args),
            ctl.timeout
        );

        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        // Closed stdin: a run that falls through to the interactive prompt sees EOF and exits.
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        let output = wait_with_control(&mut child, ctl)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if self.log_stderr && !stderr.trim().is_empty() {
            debug!("engine stderr: {}", stderr.trim());
        }

        Ok(ExecutionOutcome {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

/// Picks the first candidate that exists. Candidates containing a path
/// separator are taken as paths; bare names are searched on PATH.
pub fn resolve_binary(candidates: &[String]) -> Result<PathBuf, ProcessError> {
    for raw in candidates {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        if raw.contains('/') || raw.contains(std::path::MAIN_SEPARATOR) {
            let p = expand_tilde(raw);
            if p.is_file() {
                return Ok(p);
            }
            continue;
        }
        if let Some(found) = search_path(raw) {
            return Ok(found);
        }
    }
    Err(ProcessError::BinaryNotFound {
        candidates: candidates.to_vec(),
    })
}

fn search_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

fn wait_with_control(child: &mut Child, ctl: &RunControl) -> Result<Output, ProcessError> {
    // Drain pipes while waiting so a chatty engine can't block on a full buffer.
    let stdout = PipeDrain::spawn(child.stdout.take());
    let stderr = PipeDrain::spawn(child.stderr.take());

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Output {
                status,
                stdout: stdout.finish("stdout")?,
                stderr: stderr.finish("stderr")?,
            });
        }

        // After a kill the readers are abandoned: a forked helper of the engine
        // can hold the pipes open long after the child itself is reaped.
        if ctl.cancel.is_cancelled() {
            warn!("engine run cancelled; killing pid {}", child.id());
            let _ = child.kill();
            child.wait()?;
            return Err(ProcessError::Cancelled);
        }

        if let Some(timeout) = ctl.timeout {
            if start.elapsed() > timeout {
                warn!("engine timed out after {:?}", timeout);
                let _ = child.kill();
                child.wait()?;
                return Err(ProcessError::TimedOut {
                    timeout,
                    stderr: String::from_utf8_lossy(&stderr.snapshot()).into_owned(),
                });
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Reads one child pipe on a helper thread into a shared buffer.
struct PipeDrain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl PipeDrain {
    fn spawn<R: Read + Send + 'static>(reader: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = std::thread::spawn(move || {
            let Some(mut r) = reader else {
                return Ok(());
            };
            let mut chunk = [0u8; 8192];
            loop {
                let n = match r.read(&mut chunk) {
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if n == 0 {
                    return Ok(());
                }
                if let Ok(mut b) = sink.lock() {
                    b.extend_from_slice(&chunk[..n]);
                }
            }
        });
        Self { buf, handle }
    }

    /// Bytes read so far, without waiting for EOF.
    fn snapshot(&self) -> Vec<u8> {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Waits for EOF and returns everything read.
    fn finish(self, stream: &str) -> Result<Vec<u8>, ProcessError> {
        let Self { buf, handle } = self;
        handle
            .join()
            .map_err(|_| std::io::Error::other(format!("{stream} reader thread panicked")))??;
        let bytes = buf.lock().map(|mut b| std::mem::take(&mut *b)).unwrap_or_default();
        Ok(bytes)
    }
}
