//! onepage CLI - build a single HTML page from a template and a dotenv file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use onepage_static::{BuildError, EnvError};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "onepage")]
#[command(about = "Build a single HTML page from a template and a dotenv file")]
#[command(version)]
pub struct Cli {
    /// Build mode; "domain" loads .env.domain, anything else loads .env.gh
    mode: Option<String>,

    /// Project root containing the template and env files
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Path to onepage.toml config file, relative to the root
    #[arg(short, long, default_value = "onepage.toml")]
    config: PathBuf,

    /// Output directory (defaults to config or "dist")
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// HTML-escape interpolated values
    #[arg(long)]
    escape_html: bool,

    /// Write files through a temp file and rename
    #[arg(long)]
    atomic: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let args = commands::build::BuildArgs {
        mode: cli.mode,
        root: cli.root,
        config: cli.config,
        output: cli.output,
        escape_html: cli.escape_html,
        atomic: cli.atomic,
    };

    match commands::build::run(args, onepage_static::env::process_vars()) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if is_missing_required(&e) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e),
    }
}

fn is_missing_required(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::Env(EnvError::MissingRequired))
    ) || matches!(
        err.downcast_ref::<EnvError>(),
        Some(EnvError::MissingRequired)
    )
}
