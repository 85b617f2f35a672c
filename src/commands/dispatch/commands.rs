//! Command implementations for all tool-eval commands

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{capture, run, tools};
use tool_eval_core::error::{ExitCode, Result};

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<ExitCode> {
        match self {
            Commands::Run {
                suite,
                responses,
                runs,
                seed,
                pass_rule,
                max_concurrent,
                model,
                config,
            } => run::execute(
                ctx,
                run::RunArgs {
                    suite,
                    responses,
                    runs: *runs,
                    seed: seed.as_deref(),
                    pass_rule: pass_rule.as_deref(),
                    max_concurrent: *max_concurrent,
                    model,
                    config: config.as_deref(),
                },
            ),

            Commands::Tools {
                suite,
                no_strict,
                config,
            } => tools::execute(ctx, suite, *no_strict, config.as_deref()),

            Commands::Capture {
                suite,
                responses,
                include_context,
                model,
                config,
            } => capture::execute(
                ctx,
                suite,
                responses,
                *include_context,
                model,
                config.as_deref(),
            ),
        }
    }
}
