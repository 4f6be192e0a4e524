use anyhow::Result;
use clap::Parser;
use gs_transcode::cli;
use tracing::error;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        if tracing::dispatcher::has_been_set() {
            error!("{:#}", err);
        } else {
            // Config errors happen before logging is set up.
            eprintln!("error: {:#}", err);
        }
        std::process::exit(1);
    }
    Ok(())
}
