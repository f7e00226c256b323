use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use backtrack_core::{HistoryConfig, UnitKind};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::script::{EditorSession, ScriptSummary, run_script};

#[derive(Debug, Parser)]
#[command(
    name = "backtrack",
    about = "Drive a text document through an undo/redo history",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log history events to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record full copies of the document on every edit.
    Snapshot(SessionArgs),

    /// Record each edit as a reversible command.
    Command(SessionArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// Maximum undo depth. Overrides the config file.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// History config, TOML or JSON by extension.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read commands from a file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,
}

impl Commands {
    fn split(&self) -> (UnitKind, &SessionArgs) {
        match self {
            Self::Snapshot(args) => (UnitKind::Snapshot, args),
            Self::Command(args) => (UnitKind::Command, args),
        }
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(&cli, stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

/// Run a session, reading from `input` unless `--script` names a file.
pub fn run_with<R: BufRead, W: Write>(cli: &Cli, input: R, out: &mut W) -> Result<ScriptSummary> {
    let (kind, args) = cli.command.split();
    let config = resolve_config(args)?;
    let mut session = EditorSession::new(kind, &config)?;

    let summary = match &args.script {
        Some(path) => run_script(&mut session, BufReader::new(File::open(path)?), out)?,
        None => run_script(&mut session, input, out)?,
    };
    tracing::debug!(
        target: "backtrack.cli",
        model = %session.kind(),
        lines = summary.lines,
        executed = summary.executed,
        empty_steps = summary.empty_steps,
        "script finished"
    );
    Ok(summary)
}

/// Config file first, then `--capacity` on top.
pub fn resolve_config(args: &SessionArgs) -> Result<HistoryConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => HistoryConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = HistoryConfig::new(capacity)?.capacity;
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<HistoryConfig> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        HistoryConfig::from_json_str(&std::fs::read_to_string(path)?)?
    } else {
        HistoryConfig::from_toml_file(path)?
    };
    Ok(config)
}

/// Install the stderr subscriber. `RUST_LOG` applies unless `-v` is given.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
