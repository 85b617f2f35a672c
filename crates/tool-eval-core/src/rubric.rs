//! Pass/warn/fail policy for evaluation cases

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds and short-circuit switches applied to a case's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalRubric {
    pub fail_threshold: f64,
    pub warn_threshold: f64,
    pub fail_on_tool_selection: bool,
    pub fail_on_tool_call_quantity: bool,
    pub tool_selection_weight: f64,
}

impl Default for EvalRubric {
    fn default() -> Self {
        Self {
            fail_threshold: 0.8,
            warn_threshold: 0.9,
            fail_on_tool_selection: true,
            fail_on_tool_call_quantity: true,
            tool_selection_weight: 1.0,
        }
    }
}

impl EvalRubric {
    /// Check thresholds lie in [0, 1] and the selection weight is usable
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("fail_threshold", self.fail_threshold),
            ("warn_threshold", self.warn_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvalError::invalid_value(
                    &format!("rubric {name}"),
                    format!("{value} (must be between 0.0 and 1.0)"),
                ));
            }
        }
        if !self.tool_selection_weight.is_finite() || self.tool_selection_weight < 0.0 {
            return Err(EvalError::invalid_value(
                "rubric tool_selection_weight",
                format!("{} (must be finite and >= 0)", self.tool_selection_weight),
            ));
        }
        Ok(())
    }

    /// Classify a score into `(passed, warning)`
    pub fn classify(&self, score: f64) -> (bool, bool) {
        let passed = score >= self.fail_threshold;
        let warning = !passed && score >= self.warn_threshold;
        (passed, warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rubric = EvalRubric::default();
        assert_eq!(rubric.fail_threshold, 0.8);
        assert_eq!(rubric.warn_threshold, 0.9);
        assert!(rubric.fail_on_tool_selection);
        assert!(rubric.fail_on_tool_call_quantity);
        assert_eq!(rubric.tool_selection_weight, 1.0);
        assert!(rubric.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let rubric = EvalRubric {
            fail_threshold: 1.5,
            ..Default::default()
        };
        let err = rubric.validate().unwrap_err();
        assert!(err.to_string().contains("fail_threshold"));
    }

    #[test]
    fn test_classify() {
        let rubric = EvalRubric {
            fail_threshold: 0.8,
            warn_threshold: 0.6,
            ..Default::default()
        };
        assert_eq!(rubric.classify(0.85), (true, false));
        assert_eq!(rubric.classify(0.7), (false, true));
        assert_eq!(rubric.classify(0.5), (false, false));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let rubric: EvalRubric = toml::from_str("fail_threshold = 0.5").unwrap();
        assert_eq!(rubric.fail_threshold, 0.5);
        assert_eq!(rubric.warn_threshold, 0.9);
    }
}
