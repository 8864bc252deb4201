//! Command-line interface for erdreplay

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use erdreplay::ddl::{Command, parse_statements};
use erdreplay::sink::DirectorySink;
use erdreplay::{NoopPolicy, RenderOptions, ReplayConfig};

/// Replay DDL migrations into step-by-step ER diagram snapshots
#[derive(Parser)]
#[command(name = "erdreplay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (falls back to ERDREPLAY_LOG_LEVEL, then RUST_LOG)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Set log format (falls back to ERDREPLAY_LOG_FORMAT)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one SVG per statement plus the final diagram source
    Replay {
        /// Statement log, one statement per line (use - for stdin)
        input: PathBuf,

        /// Directory for step{N}.svg snapshots
        #[arg(short, long, default_value = "svgs")]
        out_dir: PathBuf,

        /// Path of the final diagram source
        #[arg(short, long, default_value = "schema.d2")]
        source: PathBuf,

        /// Emit no snapshot for unrecognized or malformed statements
        #[arg(long)]
        skip_noop: bool,

        /// Fail on malformed statements instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Margin around each diagram, in pixels
        #[arg(long, default_value_t = 40.0)]
        padding: f64,
    },

    /// Show how each statement is classified
    Parse {
        /// Statement log (use - for stdin)
        input: PathBuf,
    },

    /// Print the final diagram source without rendering
    Source {
        /// Statement log (use - for stdin)
        input: PathBuf,

        /// Fail on malformed statements instead of skipping them
        #[arg(long)]
        strict: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay {
            input,
            out_dir,
            source,
            skip_noop,
            strict,
            padding,
        } => {
            let config = ReplayConfig {
                noop_policy: if skip_noop { NoopPolicy::Skip } else { NoopPolicy::Emit },
                strict,
                render: RenderOptions {
                    padding,
                    ..RenderOptions::default()
                },
            };
            replay_command(&input, &out_dir, &source, &config)
        }
        Commands::Parse { input } => parse_command(&input),
        Commands::Source { input, strict } => source_command(&input, strict),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn replay_command(input: &Path, out_dir: &Path, source: &Path, config: &ReplayConfig) -> Result<()> {
    let content = read_input(input)?;
    let mut sink = DirectorySink::new(out_dir, source)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let report = erdreplay::replay(&content, config, &mut sink)
        .with_context(|| format!("Replay of {} failed", input.display()))?;

    info!(
        snapshots = report.snapshots,
        noops = report.noops.len(),
        out_dir = %out_dir.display(),
        source = %source.display(),
        "done"
    );
    Ok(())
}

fn parse_command(input: &Path) -> Result<()> {
    let content = read_input(input)?;
    for statement in parse_statements(&content) {
        let marker = match statement.command {
            Command::Unrecognized | Command::Malformed { .. } => "-",
            _ => "+",
        };
        println!("{} {:>3}  line {:<4} {}", marker, statement.index, statement.line, statement.command);
    }
    Ok(())
}

fn source_command(input: &Path, strict: bool) -> Result<()> {
    let content = read_input(input)?;
    let config = ReplayConfig {
        strict,
        ..ReplayConfig::default()
    };
    let source = erdreplay::replay_source(&content, &config)
        .with_context(|| format!("Replay of {} failed", input.display()))?;
    print!("{}", source);
    Ok(())
}
