//! Read-eval-print loop driving the interpreter

use std::io::{BufRead, Write};

use kindred_core::FamilyTree;

use crate::interpreter::{execute, parse, CommandError};
use crate::output::{format_error, format_outcome, Outcome, OutputFormat};

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

/// Counters for a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub commands: usize,
    pub errors: usize,
}

/// One interpreter session over a single in-memory tree
pub struct Session<W: Write> {
    tree: FamilyTree,
    format: OutputFormat,
    out: W,
    stats: SessionStats,
}

impl<W: Write> Session<W> {
    pub fn new(tree: FamilyTree, format: OutputFormat, out: W) -> Self {
        Self {
            tree,
            format,
            out,
            stats: SessionStats::default(),
        }
    }

    /// Parse, run and print one line. A failed command is printed, counted
    /// and returned so the caller can decide whether to stop.
    pub fn execute_line(&mut self, line: &str) -> anyhow::Result<Result<Step, CommandError>> {
        let command = match parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Ok(Step::Continue)),
            Err(e) => return self.report(e).map(Err),
        };
        self.stats.commands += 1;

        match execute(&mut self.tree, command) {
            Ok(Outcome::Exit) => Ok(Ok(Step::Exit)),
            Ok(outcome) => {
                for line in format_outcome(&outcome, self.format) {
                    writeln!(self.out, "{}", line)?;
                }
                Ok(Ok(Step::Continue))
            }
            Err(e) => self.report(e).map(Err),
        }
    }

    fn report(&mut self, error: CommandError) -> anyhow::Result<CommandError> {
        self.stats.errors += 1;
        tracing::debug!("Command failed ({}): {}", error.kind(), error);
        writeln!(self.out, "{}", format_error(&error, self.format))?;
        Ok(error)
    }

    /// Run every line of `input`, printing `prompt` before each read.
    ///
    /// With `strict`, the first failing line ends the session with an error.
    pub fn run<R: BufRead>(
        &mut self,
        input: R,
        prompt: Option<&str>,
        strict: bool,
    ) -> anyhow::Result<SessionStats> {
        let mut lines = input.lines();
        let mut number = 0;

        loop {
            if let Some(prompt) = prompt {
                write!(self.out, "{}", prompt)?;
                self.out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            number += 1;

            match self.execute_line(&line)? {
                Ok(Step::Continue) => {}
                Ok(Step::Exit) => break,
                Err(e) if strict => anyhow::bail!("line {}: {}", number, e),
                Err(_) => {}
            }
        }

        self.out.flush()?;
        tracing::info!(
            "Session finished: {} commands, {} errors",
            self.stats.commands,
            self.stats.errors
        );
        Ok(self.stats)
    }
}
