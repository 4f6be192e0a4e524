pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod request;
pub mod transcoder;
pub mod util;
pub mod validate;

pub use error::TranscodeError;
pub use request::{Operation, TranscodeRequest};
pub use transcoder::Transcoder;
