//! Interactive shell and script runner

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::session::Session;
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct RunArgs {
    /// Script with one command per line
    pub script: PathBuf,

    /// Stop at the first failing command and exit non-zero
    #[arg(long)]
    pub strict: bool,
}

/// Read commands from stdin until EOF or EXIT
pub fn run_shell(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let prompt = stdin
        .is_terminal()
        .then_some(ctx.config.prompt.as_str());
    tracing::debug!("Starting shell (interactive: {})", prompt.is_some());

    let mut session = Session::new(ctx.config.build_tree(), ctx.format(cli), io::stdout().lock());
    session.run(stdin.lock(), prompt, false)?;
    Ok(())
}

/// Execute a script file
pub fn run_script(args: &RunArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let file = File::open(&args.script)
        .with_context(|| format!("Failed to open script {}", args.script.display()))?;
    tracing::info!("Running script {}", args.script.display());

    let mut session = Session::new(ctx.config.build_tree(), ctx.format(cli), io::stdout().lock());
    let stats = session.run(BufReader::new(file), None, args.strict)?;
    tracing::info!(
        "Script {} ran {} commands ({} failed)",
        args.script.display(),
        stats.commands,
        stats.errors
    );
    Ok(())
}
