use gs_transcode::{
    engine::{ExecutionOutcome, ProcessRunner, RunControl},
    error::ProcessError,
};
use std::sync::Mutex;

/// Records every argument vector and answers with a canned result.
pub struct SpyRunner {
    pub calls: Mutex<Vec<Vec<String>>>,
    exit_code: i32,
    write_output: bool,
    fail: Option<fn() -> ProcessError>,
}

impl SpyRunner {
    /// Exits 0 and writes the `-sOutputFile` target.
    pub fn succeeding() -> Self {
        Self::new(0, true)
    }

    /// Exits 0 without writing anything.
    pub fn silent() -> Self {
        Self::new(0, false)
    }

    pub fn exiting(code: i32) -> Self {
        Self::new(code, false)
    }

    pub fn erroring(fail: fn() -> ProcessError) -> Self {
        Self {
            fail: Some(fail),
            ..Self::new(0, false)
        }
    }

    fn new(exit_code: i32, write_output: bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            exit_code,
            write_output,
            fail: None,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProcessRunner for SpyRunner {
    fn run(&self, args: &[String], _ctl: &RunControl) -> Result<ExecutionOutcome, ProcessError> {
        self.calls.lock().unwrap().push(args.to_vec());
        if let Some(fail) = self.fail {
            return Err(fail());
        }
        if self.write_output {
            let dest = args
                .iter()
                .find_map(|a| a.strip_prefix("-sOutputFile="))
                .expect("output flag");
            std::fs::write(dest, b"%PDF-stub").expect("write stub output");
        }
        let mut outcome = ExecutionOutcome::from_code(self.exit_code);
        if self.exit_code != 0 {
            outcome.stderr = "GPL Ghostscript: Unrecoverable error".to_string();
        }
        Ok(outcome)
    }
}
