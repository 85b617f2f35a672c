//! `tool-eval run`

use std::path::Path;
use std::sync::Arc;

use tool_eval_core::error::{ExitCode, Result};
use tool_eval_core::model::ReplayModel;
use tracing::debug;

use super::dispatch::command::CommandContext;
use super::format;
use super::shared;
use crate::cli::OutputFormat;

pub struct RunArgs<'a> {
    pub suite: &'a Path,
    pub responses: &'a Path,
    pub runs: Option<usize>,
    pub seed: Option<&'a str>,
    pub pass_rule: Option<&'a str>,
    pub max_concurrent: Option<usize>,
    pub model: &'a str,
    pub config: Option<&'a Path>,
}

pub fn execute(ctx: &CommandContext, args: RunArgs) -> Result<ExitCode> {
    let config = shared::load_config(args.suite, args.config)?;

    let mut options = config.to_run_options()?;
    if let Some(runs) = args.runs {
        options.num_runs = runs;
    }
    if let Some(seed) = args.seed {
        options.seed = seed.parse()?;
    }
    if let Some(pass_rule) = args.pass_rule {
        options.pass_rule = pass_rule.parse()?;
    }

    let mut suite = shared::load_suite(args.suite, &config)?;
    if let Some(max_concurrent) = args.max_concurrent {
        suite = suite.with_max_concurrent(max_concurrent);
    }

    let model = Arc::new(ReplayModel::from_file(args.responses)?);
    let report = shared::runtime()?.block_on(suite.run(model, args.model, options))?;
    debug!(elapsed = ?ctx.start.elapsed(), "run_suite");

    match ctx.cli.format {
        OutputFormat::Human => format::print_report(&report, ctx.cli.quiet),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.failed_count() > 0 {
        Ok(ExitCode::Failure)
    } else {
        Ok(ExitCode::Success)
    }
}
