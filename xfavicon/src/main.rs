use anyhow::Result;
use clap::Parser;
use console::style;
use favicon::{Preset, Scaler};
use std::io::Write;
use std::path::PathBuf;

mod task;

use task::TaskRunner;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Icon set to generate (favicons or logos)
    #[clap(long, default_value_t = Preset::Favicons)]
    preset: Preset,
    /// Directory the default source and output paths are relative to
    #[clap(long)]
    base: Option<PathBuf>,
    /// Source logo, defaults to the preset's logo under the base directory
    #[clap(short, long)]
    source: Option<PathBuf>,
    /// Output directory, defaults to the preset's directory under the base directory
    #[clap(short, long)]
    out: Option<PathBuf>,
    /// Show timings and debug logs
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
    let args = Args::parse();
    tracing_log::LogTracer::init().ok();
    let default = if args.verbose { "debug" } else { "error" };
    let env = std::env::var("XFAVICON_LOG").unwrap_or_else(|_| default.into());
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_span_events(FmtSpan::ACTIVE | FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::new(env))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
    log_panics::init();
    let mut stdout = std::io::stdout().lock();
    let code = run(args, &mut stdout)?;
    stdout.flush()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Writes the status lines to `w` and returns the exit code: `1` if the
/// source could not be loaded or any target failed.
fn run(args: Args, w: &mut impl Write) -> Result<i32> {
    let base = match args.base {
        Some(base) => base,
        None => std::env::current_dir()?,
    };
    let source = args
        .source
        .unwrap_or_else(|| base.join(args.preset.default_source()));
    let out = args
        .out
        .unwrap_or_else(|| base.join(args.preset.default_output()));

    writeln!(w, "Source logo: {}", source.display())?;
    writeln!(w, "Output directory: {}", out.display())?;

    if let Err(err) = favicon::check_source(&source) {
        writeln!(w, "{} {}", style("Error:").red(), err)?;
        return Ok(1);
    }
    let scaler = match Scaler::open(&source) {
        Ok(scaler) => scaler,
        Err(err) => {
            writeln!(w, "{} {:#}", style("Error opening logo:").red(), err)?;
            return Ok(1);
        }
    };
    let table = args.preset.targets()?;
    let mut runner = TaskRunner::new(table.len(), args.verbose);
    let mut status: std::io::Result<()> = Ok(());
    let report = favicon::generate(&scaler, &table, &out, |outcome| {
        if status.is_ok() {
            status = runner.finish_task(&mut *w, outcome);
        }
    })?;
    status?;
    tracing::debug!(
        "{} of {} targets failed",
        report.failed().count(),
        table.len()
    );
    Ok(if report.is_success() { 0 } else { 1 })
}
