use crate::request::TranscodeRequest;
use std::path::Path;

/// Maps a request to the exact ghostscript argument vector.
///
/// Ghostscript is order-sensitive, so the vectors below are fixed. Page
/// numbers are passed through unchecked; rejecting them is the engine's job.
pub fn build_args(req: &TranscodeRequest) -> Vec<String> {
    match req {
        TranscodeRequest::ToImage { input, destination } => vec![
            "-sDEVICE=jpeg".to_string(),
            "-dNOPAUSE".to_string(),
            "-dBATCH".to_string(),
            "-dSAFER".to_string(),
            output_file(destination),
            path_arg(input),
        ],
        TranscodeRequest::ToPdf {
            input,
            destination,
            page_start,
            page_quantity,
        } => {
            let (first, last) = page_bounds(*page_start, *page_quantity);
            vec![
                "-sDEVICE=pdfwrite".to_string(),
                "-dNOPAUSE".to_string(),
                "-dBATCH".to_string(),
                "-dSAFER".to_string(),
                format!("-dFirstPage={first}"),
                format!("-dLastPage={last}"),
                output_file(destination),
                path_arg(input),
            ]
        }
        TranscodeRequest::Concatenate {
            inputs,
            destination,
        } => {
            let mut args = vec![
                "-dBatch".to_string(),
                "-dNOPAUSE".to_string(),
                "-q".to_string(),
                "-sDEVICE=pdfwrite".to_string(),
                output_file(destination),
            ];
            args.extend(inputs.iter().map(|p| path_arg(p)));
            args
        }
    }
}

/// Inclusive 1-based page bounds for a start page and a page count.
pub fn page_bounds(page_start: u32, page_quantity: u32) -> (i64, i64) {
    let first = i64::from(page_start);
    (first, first + i64::from(page_quantity) - 1)
}

/// Renders argv as a single shell-ish line for logs.
pub fn display_command(binary: &Path, args: &[String]) -> String {
    let mut line = binary.display().to_string();
    for a in args {
        line.push(' ');
        if a.contains(char::is_whitespace) {
            line.push('\'');
            line.push_str(a);
            line.push('\'');
        } else {
            line.push_str(a);
        }
    }
    line
}

fn output_file(destination: &Path) -> String {
    format!("-sOutputFile={}", destination.to_string_lossy())
}

fn path_arg(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}
