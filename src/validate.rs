use crate::error::TranscodeError;
use crate::request::Operation;
use std::path::{Path, PathBuf};

/// Engine arguments are strings; a path that can't be one would reach the
/// engine mangled, so it is refused up front.
pub fn check_utf8_paths<'a>(
    operation: Operation,
    paths: impl IntoIterator<Item = &'a Path>,
) -> Result<(), TranscodeError> {
    match paths.into_iter().find(|p| p.to_str().is_none()) {
        Some(bad) => Err(TranscodeError::NonUtf8Path {
            operation,
            path: bad.to_path_buf(),
        }),
        None => Ok(()),
    }
}

/// Fails on the first input, in order, that does not exist.
pub fn check_inputs(inputs: &[PathBuf]) -> Result<(), TranscodeError> {
    match inputs.iter().find(|p| !p.exists()) {
        Some(missing) => Err(TranscodeError::InputNotFound {
            path: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// The engine can exit zero without writing anything, so existence of the
/// destination is checked after every successful run.
pub fn check_output(operation: Operation, destination: &Path) -> Result<(), TranscodeError> {
    if destination.exists() {
        Ok(())
    } else {
        Err(TranscodeError::OutputMissing {
            operation,
            destination: destination.to_path_buf(),
        })
    }
}
