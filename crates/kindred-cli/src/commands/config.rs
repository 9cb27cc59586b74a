//! Config command for managing CLI configuration

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::AppContext;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name (see `config list`)
        key: String,
    },
    /// Change one setting and write the config file
    Set {
        key: String,
        value: String,
    },
    /// Print every setting with its effective value
    List,
    /// Print the config file location
    Path,
    /// Write a config file holding the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(ctx, key),
        ConfigCommands::Set { key, value } => run_set(ctx, key, value),
        ConfigCommands::List => run_list(ctx),
        ConfigCommands::Path => run_path(ctx),
        ConfigCommands::Init { force } => run_init(ctx, *force),
    }
}

fn run_get(ctx: &AppContext, key: &str) -> anyhow::Result<()> {
    match ctx.config.get(key) {
        Some(value) => println!("{}", value),
        None => anyhow::bail!(
            "Unknown config key: {} (available: {})",
            key,
            Config::keys().join(", ")
        ),
    }
    Ok(())
}

fn run_set(ctx: &AppContext, key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = ctx.config.clone();
    config.set(key, value)?;
    config.save(&ctx.config_path)?;
    tracing::info!("Set {} = {} in {}", key, value, ctx.config_path.display());
    println!("Set {} = {}", key, value);
    Ok(())
}

fn run_list(ctx: &AppContext) -> anyhow::Result<()> {
    println!("Config file: {}", ctx.config_path.display());
    println!();
    for key in Config::keys() {
        let value = ctx.config.get(key).unwrap_or_else(|| "(not set)".to_string());
        println!("{} = {}", key, value);
    }
    Ok(())
}

fn run_path(ctx: &AppContext) -> anyhow::Result<()> {
    println!("{}", ctx.config_path.display());
    Ok(())
}

fn run_init(ctx: &AppContext, force: bool) -> anyhow::Result<()> {
    let path = &ctx.config_path;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save(path)?;
    println!("Created config file at {}", path.display());
    Ok(())
}
