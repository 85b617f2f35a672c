//! Command trait and context for dispatching commands

use std::time::Instant;

use crate::cli::Cli;
use tool_eval_core::error::{ExitCode, Result};

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Self {
        Self { cli, start }
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<ExitCode>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<ExitCode> {
        println!("tool-eval {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Score recorded model tool calls against evaluation suites.");
        println!();
        println!("Run `tool-eval --help` for usage information.");
        Ok(ExitCode::Success)
    }
}
