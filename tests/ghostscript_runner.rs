#![cfg(unix)]

use gs_transcode::{
    Operation, TranscodeError, Transcoder,
    config::EngineConfig,
    engine::{CancelToken, GhostscriptRunner, ProcessRunner, RunControl, ghostscript::resolve_binary},
    error::ProcessError,
};
use std::time::{Duration, Instant};

fn runner_for(binary: &str) -> GhostscriptRunner {
    let cfg = EngineConfig {
        binaries: vec![binary.to_string()],
        ..EngineConfig::default()
    };
    GhostscriptRunner::new(&cfg).expect("binary on PATH")
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn first_existing_candidate_wins() {
    let found = resolve_binary(&args(&["definitely-not-a-gs-binary", "sh", "true"])).unwrap();
    assert!(found.ends_with("sh"));
    assert!(found.is_file());
}

#[test]
fn explicit_paths_must_exist() {
    let err = resolve_binary(&args(&["/nonexistent/bin/gs", ""])).unwrap_err();
    match err {
        ProcessError::BinaryNotFound { candidates } => {
            assert_eq!(candidates[0], "/nonexistent/bin/gs")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn captures_exit_code_and_streams() {
    let runner = runner_for("sh");
    let outcome = runner
        .run(&args(&["-c", "echo rendered; echo warning >&2; exit 3"]), &RunControl::default())
        .unwrap();
    assert_eq!(outcome.exit_code, Some(3));
    assert!(!outcome.success);
    assert_eq!(outcome.stdout.trim(), "rendered");
    assert!(outcome.stderr.contains("warning"));
}

#[test]
fn env_from_config_reaches_the_process() {
    let mut cfg = EngineConfig {
        binaries: vec!["sh".to_string()],
        ..EngineConfig::default()
    };
    cfg.env.insert("GS_TRANSCODE_TEST".into(), "yes".into());
    let runner = GhostscriptRunner::new(&cfg).unwrap();
    let outcome = runner
        .run(&args(&["-c", "printf %s \"$GS_TRANSCODE_TEST\""]), &RunControl::default())
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.stdout, "yes");
}

#[test]
fn slow_engine_is_killed_at_timeout() {
    let runner = runner_for("sleep");
    let ctl = RunControl::new(Some(Duration::from_millis(200)), CancelToken::new());
    let started = Instant::now();
    let err = runner.run(&args(&["5"]), &ctl).unwrap_err();
    assert!(matches!(err, ProcessError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn timeout_does_not_wait_for_forked_helpers() {
    let runner = runner_for("sh");
    let ctl = RunControl::new(Some(Duration::from_millis(200)), CancelToken::new());
    let started = Instant::now();
    let err = runner
        .run(&args(&["-c", "echo starting >&2; sleep 4; true"]), &ctl)
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    match err {
        ProcessError::TimedOut { timeout, stderr } => {
            assert_eq!(timeout, Duration::from_millis(200));
            assert!(stderr.contains("starting"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn cancel_does_not_wait_for_forked_helpers() {
    let runner = runner_for("sh");
    let ctl = RunControl::new(None, CancelToken::new());
    let canceller = {
        let token = ctl.cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            token.cancel();
        })
    };
    let started = Instant::now();
    let err = runner.run(&args(&["-c", "sleep 4; true"]), &ctl).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err, ProcessError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn cancellation_kills_running_engine() {
    let runner = runner_for("sleep");
    let token = CancelToken::new();
    let ctl = RunControl::new(None, token.clone());

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        token.cancel();
    });
    let started = Instant::now();
    let err = runner.run(&args(&["5"]), &ctl).unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, ProcessError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn cancelled_before_start_does_not_spawn() {
    let runner = runner_for("sleep");
    let token = CancelToken::new();
    token.cancel();
    let started = Instant::now();
    let err = runner
        .run(&args(&["5"]), &RunControl::new(None, token))
        .unwrap_err();
    assert!(matches!(err, ProcessError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn engine_exiting_zero_without_output_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let t = Transcoder::new(runner_for("true"), None);
    let err = t
        .to_image(dir.path().join("doc.pdf"), dir.path().join("out.jpg"))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        TranscodeError::OutputMissing { operation: Operation::Image, .. }
    ));
}

#[test]
fn failing_engine_surfaces_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let t = Transcoder::new(runner_for("false"), None);
    let err = t
        .to_pdf(dir.path().join("doc.pdf"), dir.path().join("out.pdf"), 2, 3)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        TranscodeError::ExecutionFailure { operation: Operation::Pdf, exit_code: Some(1), .. }
    ));
}

#[test]
fn from_config_reports_missing_binary() {
    let cfg = EngineConfig {
        binaries: vec!["no-such-ghostscript-here".to_string()],
        ..EngineConfig::default()
    };
    let err = Transcoder::from_config(&cfg).err().unwrap();
    assert!(matches!(err, ProcessError::BinaryNotFound { .. }));
}
