//! banish CLI entry point.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use banish::{
    CheckOutcome, Config, Digest, DumpFormat, ScanReport, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE,
};

/// Record file fingerprints so the files can be recognized later.
///
/// By default FILENAME is hashed, registered, and its digest printed.
#[derive(Parser, Debug)]
#[command(name = "banish", version, about, long_about = None)]
struct Cli {
    /// File to register (or directory, with --scan).
    #[arg(required_unless_present = "dump")]
    filename: Option<PathBuf>,

    /// Register every regular file under FILENAME.
    #[arg(long)]
    scan: bool,

    /// Print every stored signature as `<hex-digest> <size>` and exit.
    #[arg(long)]
    dump: bool,

    /// Report whether FILENAME is registered without registering it.
    #[arg(long, conflicts_with = "scan")]
    check: bool,

    /// Emit the dump as JSON lines.
    #[arg(long, requires = "dump")]
    json: bool,

    /// Registry directory (defaults to ~/.local/banish).
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Read block size used while hashing.
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new()
            .range(1..=MAX_CHUNK_SIZE as u64)
    )]
    chunk_size: usize,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = match &cli.data_dir {
        Some(dir) => Config::new(dir),
        None => Config::from_home()?,
    }
    .with_chunk_size(cli.chunk_size);
    tracing::debug!(data_dir = %config.data_directory.display(), "using registry");

    if cli.dump {
        let format = if cli.json {
            DumpFormat::Json
        } else {
            DumpFormat::Text
        };
        let mut stdout = std::io::stdout().lock();
        banish::dump(&config, &mut stdout, format).context("dumping signatures")?;
        return Ok(0);
    }

    let filename = cli
        .filename
        .as_deref()
        .context("FILENAME is required")?;

    if cli.scan {
        run_scan(&config, filename)
    } else if cli.check {
        run_check(&config, filename)
    } else {
        let sig = banish::register(&config, filename)
            .with_context(|| format!("registering {}", filename.display()))?;
        print_digest(&mut std::io::stdout().lock(), &sig.digest)?;
        Ok(0)
    }
}

fn run_scan(config: &Config, root: &Path) -> Result<u8> {
    let report =
        banish::scan(config, root).with_context(|| format!("scanning {}", root.display()))?;

    let mut stdout = std::io::stdout().lock();
    for (path, sig) in &report.registered {
        writeln!(stdout, "{} {}", sig.digest, path.display())?;
    }
    for (path, err) in &report.failed {
        tracing::error!(path = %path.display(), "{err}");
    }
    tracing::info!(
        registered = report.registered.len(),
        failed = report.failed.len(),
        "scan finished"
    );

    Ok(scan_exit_code(&report))
}

/// Write failures (a closed pipe, say) propagate instead of panicking.
fn print_digest<W: Write>(out: &mut W, digest: &Digest) -> Result<()> {
    writeln!(out, "{digest}")?;
    out.flush()?;
    Ok(())
}

/// Any entry that could not be registered fails the whole scan.
fn scan_exit_code(report: &ScanReport) -> u8 {
    if report.is_clean() {
        0
    } else {
        1
    }
}

fn run_check(config: &Config, path: &Path) -> Result<u8> {
    let outcome =
        banish::check(config, path).with_context(|| format!("checking {}", path.display()))?;
    match outcome {
        CheckOutcome::Known(sig) => {
            print_digest(&mut std::io::stdout().lock(), &sig.digest)?;
            Ok(0)
        }
        CheckOutcome::Unknown(_) => {
            tracing::info!(path = %path.display(), "not registered");
            Ok(1)
        }
    }
}
