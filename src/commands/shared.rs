use std::path::Path;

use tokio::runtime::Runtime;
use tool_eval_core::config::EvalConfig;
use tool_eval_core::error::Result;
use tool_eval_core::suite::{loader, EvalSuite};
use tracing::debug;

/// Explicit `--config` wins; otherwise look beside the suite file
pub(crate) fn load_config(suite: &Path, explicit: Option<&Path>) -> Result<EvalConfig> {
    match explicit {
        Some(path) => EvalConfig::load(path),
        None => {
            let dir = suite.parent().filter(|p| !p.as_os_str().is_empty());
            EvalConfig::load_or_default(dir.unwrap_or_else(|| Path::new(".")))
        }
    }
}

pub(crate) fn load_suite(suite: &Path, config: &EvalConfig) -> Result<EvalSuite> {
    let suite = loader::load_suite(suite, config)?;
    debug!(
        suite = %suite.name,
        cases = suite.cases().len(),
        tools = suite.tool_count(),
        "load_suite"
    );
    Ok(suite)
}

pub(crate) fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
