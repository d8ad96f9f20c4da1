use anyhow::{Context, Result};
use clap::Parser;
use ncflag_store::Dataset;
use std::io::{self, Write};
use std::path::PathBuf;

mod flags;
mod report;

pub use flags::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "ncflag")]
#[command(about = "Print the flag meanings set at each position of a flag variable", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dataset document to read
    pub file: PathBuf,

    /// Flag variable to inspect
    #[arg(required_unless_present = "show_flags")]
    pub flag: Option<String>,

    /// Print the flags this tool can inspect, or the meanings of FLAG
    #[arg(long)]
    pub show_flags: bool,

    /// Variable to use to display timestamps
    #[arg(long, value_name = "VAR")]
    pub use_time_var: Option<String>,

    /// Emit one JSON object per line (implies --quiet)
    #[arg(long)]
    pub json: bool,

    /// Log level (overrides RUST_LOG)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: log only errors
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }
    init_logging(&cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run(&cli, &mut out).and_then(|()| Ok(out.flush()?));
    ignore_broken_pipe(result)
}

/// A closed stdout (`ncflag ... | head`) ends the report early, not in error
fn ignore_broken_pipe(result: Result<()>) -> Result<()> {
    match result {
        Err(err) if is_broken_pipe(&err) => Ok(()),
        other => other,
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|err| err.kind() == io::ErrorKind::BrokenPipe)
    })
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Some(level) = cli.log_level {
        builder.filter_level(level.as_filter());
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Execute a parsed command line, writing results to `out`
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let dataset = Dataset::open(&cli.file)
        .with_context(|| format!("Failed to open dataset {}", cli.file.display()))?;

    match (cli.flag.as_deref(), cli.show_flags) {
        (None, _) => report::show_flag_variables(&dataset, cli.json, out),
        (Some(flag), true) => report::show_meanings(&dataset, flag, cli.json, out),
        (Some(flag), false) => {
            log::info!("Reporting flag {flag} from {}", cli.file.display());
            report::report_flags(&dataset, flag, cli.use_time_var.as_deref(), cli.json, out)
        }
    }
}
