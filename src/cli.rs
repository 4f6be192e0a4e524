use crate::{
    config::Config,
    engine::{GhostscriptRunner, ProcessRunner, RunControl},
    request::TranscodeRequest,
    transcoder::Transcoder,
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gs-transcode")]
#[command(about = "Ghostscript-driven PDF transcoder (image, page range, concatenation)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./gs-transcode.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the resolved ghostscript binary and its version.
    Doctor {},
    /// Render a PDF to JPEG.
    Image {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Extract a page range into a new PDF.
    Pdf {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// 1-based first page.
        #[arg(long, default_value_t = 1)]
        first_page: u32,
        /// Number of pages to keep.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Merge PDFs in the given order.
    Concat {
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Image { input, output } => {
            run(&cfg, TranscodeRequest::to_image(input, output))
        }
        Command::Pdf {
            input,
            output,
            first_page,
            pages,
        } => run(
            &cfg,
            TranscodeRequest::to_pdf(input, output, *first_page, *pages),
        ),
        Command::Concat { inputs, output } => {
            run(&cfg, TranscodeRequest::concatenate(inputs, output))
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("gs-transcode.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let file_path = resolve_log_path(cfg);
    let (file_layer, guard) = if let Some(path) = file_path.as_deref() {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("gs-transcode.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let runner = GhostscriptRunner::new(&cfg.engine)?;
    let ctl = RunControl::new(cfg.engine.timeout(), Default::default());
    let outcome = runner
        .run(&["--version".to_string()], &ctl)
        .with_context(|| format!("running {} --version", runner.binary().display()))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "binary": runner.binary(),
            "version": outcome.stdout.trim(),
            "ok": outcome.success,
        }))?
    );
    Ok(())
}

fn run(cfg: &Config, req: TranscodeRequest) -> Result<()> {
    let transcoder = Transcoder::from_config(&cfg.engine)?;
    info!(
        "{} using {}",
        transcoder.name(),
        transcoder.runner().binary().display()
    );

    let started = now_rfc3339();
    transcoder
        .transcode(&req)
        .with_context(|| format!("{} failed", req.operation()))?;

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "operation": req.operation(),
                "destination": req.destination(),
                "started": started,
                "finished": now_rfc3339(),
                "status": "ok"
            }))?
        );
    }
    Ok(())
}
