use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One transcode job, consumed by a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeRequest {
    ToImage {
        input: PathBuf,
        destination: PathBuf,
    },
    ToPdf {
        input: PathBuf,
        destination: PathBuf,
        page_start: u32, // 1-based
        page_quantity: u32,
    },
    Concatenate {
        inputs: Vec<PathBuf>,
        destination: PathBuf,
    },
}

impl TranscodeRequest {
    pub fn to_image(input: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::ToImage {
            input: input.into(),
            destination: destination.into(),
        }
    }

    pub fn to_pdf(
        input: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        page_start: u32,
        page_quantity: u32,
    ) -> Self {
        Self::ToPdf {
            input: input.into(),
            destination: destination.into(),
            page_start,
            page_quantity,
        }
    }

    pub fn concatenate<I, P>(inputs: I, destination: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::Concatenate {
            inputs: inputs.into_iter().map(Into::into).collect(),
            destination: destination.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::ToImage { .. } => Operation::Image,
            Self::ToPdf { .. } => Operation::Pdf,
            Self::Concatenate { .. } => Operation::Concatenation,
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            Self::ToImage { destination, .. }
            | Self::ToPdf { destination, .. }
            | Self::Concatenate { destination, .. } => destination,
        }
    }

    /// Every path that ends up on the engine command line.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            Self::ToImage { input, destination } | Self::ToPdf { input, destination, .. } => {
                vec![input.as_path(), destination.as_path()]
            }
            Self::Concatenate {
                inputs,
                destination,
            } => inputs
                .iter()
                .map(PathBuf::as_path)
                .chain(std::iter::once(destination.as_path()))
                .collect(),
        }
    }

    /// Inputs that must exist before the engine is spawned.
    ///
    /// Single-input requests return nothing here: a missing input is left for
    /// the engine to report.
    pub fn required_inputs(&self) -> &[PathBuf] {
        match self {
            Self::Concatenate { inputs, .. } => inputs,
            Self::ToImage { .. } | Self::ToPdf { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Image,
    Pdf,
    Concatenation,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Image => "transcode to image",
            Self::Pdf => "transcode to PDF",
            Self::Concatenation => "transcode to concatenated PDF",
        };
        f.write_str(s)
    }
}
