//! Configuration type definitions

use crate::multirun::{PassRule, DEFAULT_EVAL_SEED};
use crate::rubric::EvalRubric;
use serde::{Deserialize, Serialize};

/// File name looked up by [`EvalConfig::load_or_default`](super::EvalConfig::load_or_default)
pub const CONFIG_FILE_NAME: &str = "tool-eval.toml";

/// Evaluation run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Runs per case
    #[serde(default = "default_num_runs")]
    pub num_runs: usize,

    /// Seed policy: "constant", "random", or an integer
    #[serde(default = "default_seed_policy")]
    pub seed: String,

    /// Seed used by the "constant" policy
    #[serde(default = "default_seed")]
    pub default_seed: i64,

    /// How runs combine: "last", "mean", or "majority"
    #[serde(default)]
    pub pass_rule: PassRule,

    /// Cases evaluated at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Send strict-mode schemas to the model
    #[serde(default = "default_strict_mode")]
    pub strict_mode: bool,

    /// Default rubric for suites that do not declare one
    #[serde(default)]
    pub rubric: EvalRubric,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            num_runs: default_num_runs(),
            seed: default_seed_policy(),
            default_seed: default_seed(),
            pass_rule: PassRule::default(),
            max_concurrent: default_max_concurrent(),
            strict_mode: default_strict_mode(),
            rubric: EvalRubric::default(),
        }
    }
}

fn default_num_runs() -> usize {
    1
}

fn default_seed_policy() -> String {
    "constant".to_string()
}

fn default_seed() -> i64 {
    DEFAULT_EVAL_SEED
}

fn default_max_concurrent() -> usize {
    1
}

fn default_strict_mode() -> bool {
    true
}
