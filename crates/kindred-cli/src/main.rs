//! Kindred CLI - Command interpreter for the family tree

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod interpreter;
mod output;
mod session;

use commands::{completions, shell};
use config::{config_file_path, Config};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(author, version, about = "Family tree relationships and relative queries")]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, env = "KINDRED_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format, overriding the config file
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logs except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read commands from stdin (default)
    Shell,
    /// Run a command script
    Run(shell::RunArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the loaded configuration
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config_path();
        let config = Config::load(&config_path)?;
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn format(&self, cli: &Cli) -> OutputFormat {
        cli.format.unwrap_or(self.config.format)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting kindred CLI");

    let ctx = AppContext::new(&cli)?;

    match &cli.command {
        None | Some(Commands::Shell) => shell::run_shell(&cli, &ctx)?,
        Some(Commands::Run(args)) => shell::run_script(args, &cli, &ctx)?,
        Some(Commands::Config(args)) => commands::config::run(args, &ctx)?,
        Some(Commands::Completions(args)) => completions::run(args)?,
    }

    Ok(())
}
