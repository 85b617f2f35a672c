//! Evaluation configuration
//!
//! Stored as TOML, by default in `tool-eval.toml` next to the suite files.

pub mod types;

use std::fs;
use std::path::Path;

use crate::bail_invalid;
use crate::error::Result;
use crate::multirun::{RunOptions, SeedPolicy};

pub use types::{EvalConfig, CONFIG_FILE_NAME};

impl EvalConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EvalConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `tool-eval.toml` from `dir`, or defaults when it is absent
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_runs < 1 {
            bail_invalid!("num_runs", format!("{} (must be >= 1)", self.num_runs));
        }
        if self.max_concurrent < 1 {
            bail_invalid!(
                "max_concurrent",
                format!("{} (must be >= 1)", self.max_concurrent)
            );
        }
        self.seed.parse::<SeedPolicy>()?;
        self.rubric.validate()
    }

    /// Run options described by this configuration
    pub fn to_run_options(&self) -> Result<RunOptions> {
        Ok(RunOptions {
            num_runs: self.num_runs,
            seed: self.seed.parse()?,
            pass_rule: self.pass_rule,
            default_seed: self.default_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multirun::PassRule;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EvalConfig::default();
        assert_eq!(config.num_runs, 1);
        assert_eq!(config.seed, "constant");
        assert_eq!(config.default_seed, 42);
        assert_eq!(config.pass_rule, PassRule::Last);
        assert_eq!(config.max_concurrent, 1);
        assert!(config.strict_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "num_runs = 5\npass_rule = \"majority\"\n\n[rubric]\nfail_threshold = 0.6\n",
        )
        .unwrap();

        let config = EvalConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.num_runs, 5);
        assert_eq!(config.pass_rule, PassRule::Majority);
        assert_eq!(config.rubric.fail_threshold, 0.6);
        assert_eq!(config.rubric.warn_threshold, 0.9);
        assert_eq!(config.default_seed, 42);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = EvalConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, EvalConfig::default());
    }

    #[test]
    fn test_zero_runs_rejected() {
        let config = EvalConfig {
            num_runs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("num_runs"));
    }

    #[test]
    fn test_unknown_pass_rule_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "pass_rule = \"best\"\n").unwrap();
        assert!(EvalConfig::load(&path).is_err());
    }

    #[test]
    fn test_run_options_from_config() {
        let config = EvalConfig {
            num_runs: 3,
            seed: "7".into(),
            ..Default::default()
        };
        let options = config.to_run_options().unwrap();
        assert_eq!(options.num_runs, 3);
        assert_eq!(options.seed, SeedPolicy::Custom(7));
        assert_eq!(options.default_seed, 42);
    }
}
