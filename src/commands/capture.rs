//! `tool-eval capture`

use std::path::Path;
use std::sync::Arc;

use tool_eval_core::error::{ExitCode, Result};
use tool_eval_core::model::ReplayModel;
use tracing::debug;

use super::dispatch::command::CommandContext;
use super::format;
use super::shared;
use crate::cli::OutputFormat;

pub fn execute(
    ctx: &CommandContext,
    suite: &Path,
    responses: &Path,
    include_context: bool,
    model: &str,
    config: Option<&Path>,
) -> Result<ExitCode> {
    let config = shared::load_config(suite, config)?;
    let suite = shared::load_suite(suite, &config)?;
    let replay = Arc::new(ReplayModel::from_file(responses)?);

    let result = shared::runtime()?.block_on(suite.capture(replay, model, include_context))?;
    debug!(elapsed = ?ctx.start.elapsed(), "capture_suite");

    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Human => format::print_capture(&result),
    }

    if result.captured_cases.iter().any(|c| c.error.is_some()) {
        Ok(ExitCode::Failure)
    } else {
        Ok(ExitCode::Success)
    }
}
