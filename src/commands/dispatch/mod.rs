//! Command dispatch logic for tool-eval

use std::time::Instant;

use crate::cli::Cli;
use tool_eval_core::error::{ExitCode, Result};

pub mod command;
mod commands;

use command::{Command, CommandContext, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<ExitCode> {
    let ctx = CommandContext::new(cli, start);

    match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    }
}
