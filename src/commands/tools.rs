//! `tool-eval tools`

use std::path::Path;

use tool_eval_core::error::{ExitCode, Result};

use super::dispatch::command::CommandContext;
use super::shared;
use crate::cli::OutputFormat;

pub fn execute(
    ctx: &CommandContext,
    suite: &Path,
    no_strict: bool,
    config: Option<&Path>,
) -> Result<ExitCode> {
    let config = shared::load_config(suite, config)?;
    let mut suite = shared::load_suite(suite, &config)?;
    if no_strict {
        suite = suite.with_strict_mode(false);
    }
    let tools = suite.model_tools()?;

    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tools)?),
        OutputFormat::Human => {
            for tool in &tools {
                let function = &tool["function"];
                let name = function["name"].as_str().unwrap_or_default();
                match function["description"].as_str() {
                    Some(description) if !description.is_empty() && !ctx.cli.quiet => {
                        println!("{name}  {description}")
                    }
                    _ => println!("{name}"),
                }
            }
        }
    }
    Ok(ExitCode::Success)
}
