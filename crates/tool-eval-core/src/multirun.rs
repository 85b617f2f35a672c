//! Multi-run aggregation: seed policies, pass rules and run statistics

use crate::case::{EvaluationResult, FieldResult, ToolCall, TOOL_SELECTION_FIELD};
use crate::error::{EvalError, Result};
use crate::rubric::EvalRubric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Seed used by the `constant` policy unless configured otherwise
pub const DEFAULT_EVAL_SEED: i64 = 42;

/// Exclusive upper bound of seeds drawn by the `random` policy
const RANDOM_SEED_BOUND: i64 = 1 << 31;

/// How model seeds are chosen across the runs of one case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// The configured default seed for every run
    #[default]
    Constant,
    /// A fresh random seed per run
    Random,
    /// A literal seed for every run
    Custom(i64),
}

impl FromStr for SeedPolicy {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "constant" => Ok(SeedPolicy::Constant),
            "random" => Ok(SeedPolicy::Random),
            other => other.parse::<i64>().map(SeedPolicy::Custom).map_err(|_| {
                EvalError::unsupported("seed", s, "'constant', 'random', or an integer value")
            }),
        }
    }
}

impl fmt::Display for SeedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedPolicy::Constant => f.write_str("constant"),
            SeedPolicy::Random => f.write_str("random"),
            SeedPolicy::Custom(_) => f.write_str("custom"),
        }
    }
}

impl SeedPolicy {
    /// Seeds for `num_runs` runs plus the policy label shown in reports.
    ///
    /// Providers without seed support get no seeds and an `(ignored)` label.
    pub fn run_seeds(
        &self,
        num_runs: usize,
        default_seed: i64,
        supports_seed: bool,
    ) -> (String, Vec<Option<i64>>) {
        if !supports_seed {
            return (format!("{self} (ignored)"), vec![None; num_runs]);
        }
        let seeds = match self {
            SeedPolicy::Constant => vec![Some(default_seed); num_runs],
            SeedPolicy::Custom(seed) => vec![Some(*seed); num_runs],
            SeedPolicy::Random => {
                let mut rng = rand::thread_rng();
                (0..num_runs)
                    .map(|_| Some(rng.gen_range(0..RANDOM_SEED_BOUND)))
                    .collect()
            }
        };
        (self.to_string(), seeds)
    }
}

/// How per-run outcomes combine into one pass/warn decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassRule {
    /// The final run decides
    #[default]
    Last,
    /// The mean score is classified against the rubric
    Mean,
    /// More than half of the runs decide
    Majority,
}

impl FromStr for PassRule {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last" => Ok(PassRule::Last),
            "mean" => Ok(PassRule::Mean),
            "majority" => Ok(PassRule::Majority),
            other => Err(EvalError::unsupported(
                "multi-run pass rule",
                other,
                "last, majority, mean",
            )),
        }
    }
}

impl fmt::Display for PassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassRule::Last => f.write_str("last"),
            PassRule::Mean => f.write_str("mean"),
            PassRule::Majority => f.write_str("majority"),
        }
    }
}

/// Parameters of a suite run, threaded explicitly instead of read from
/// process-wide state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub num_runs: usize,
    pub seed: SeedPolicy,
    pub pass_rule: PassRule,
    pub default_seed: i64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            num_runs: 1,
            seed: SeedPolicy::Constant,
            pass_rule: PassRule::Last,
            default_seed: DEFAULT_EVAL_SEED,
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> Result<()> {
        if self.num_runs < 1 {
            return Err(EvalError::invalid_value(
                "num_runs",
                format!("{} (must be >= 1)", self.num_runs),
            ));
        }
        Ok(())
    }
}

/// Arithmetic mean and population standard deviation
pub fn compute_mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Apply a pass rule to per-run results, returning `(passed, warning)`
pub fn resolve_pass_rule(
    runs: &[EvaluationResult],
    mean_score: f64,
    pass_rule: PassRule,
    rubric: &EvalRubric,
) -> (bool, bool) {
    let Some(last) = runs.last() else {
        return (false, false);
    };
    match pass_rule {
        PassRule::Last => (last.passed, last.warning),
        PassRule::Mean => rubric.classify(mean_score),
        PassRule::Majority => {
            let majority = runs.len() / 2 + 1;
            let passed = runs.iter().filter(|r| r.passed).count();
            let warned = runs.iter().filter(|r| r.warning).count();
            if passed >= majority {
                (true, false)
            } else if passed + warned >= majority {
                (false, true)
            } else {
                (false, false)
            }
        }
    }
}

/// Mean weighted score and mean weight of one field within one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRunScore {
    pub score: f64,
    pub weight: f64,
}

/// Per-field means of one run, excluding tool selection
pub fn compute_run_field_scores(evaluation: &EvaluationResult) -> BTreeMap<String, FieldRunScore> {
    let mut grouped: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for result in &evaluation.results {
        if result.field == TOOL_SELECTION_FIELD {
            continue;
        }
        let entry = grouped.entry(result.field.as_str()).or_default();
        entry.0.push(result.score);
        entry.1.push(result.weight);
    }

    grouped
        .into_iter()
        .map(|(field, (scores, weights))| {
            let score = compute_mean_std(&scores).0;
            let weight = compute_mean_std(&weights).0;
            (field.to_string(), FieldRunScore { score, weight })
        })
        .collect()
}

/// Cross-run statistics of one critic field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticStats {
    pub run_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_deviation: f64,
    pub run_scores_normalized: Vec<f64>,
    pub mean_score_normalized: f64,
    pub std_deviation_normalized: f64,
    pub weight: f64,
}

/// Aggregate per-run field scores; a field absent from a run counts as 0
pub fn aggregate_critic_stats(
    run_field_scores: &[BTreeMap<String, FieldRunScore>],
) -> BTreeMap<String, CriticStats> {
    let fields: std::collections::BTreeSet<&String> =
        run_field_scores.iter().flat_map(|run| run.keys()).collect();

    fields
        .into_iter()
        .map(|field| {
            let per_run: Vec<FieldRunScore> = run_field_scores
                .iter()
                .map(|run| {
                    run.get(field).copied().unwrap_or(FieldRunScore {
                        score: 0.0,
                        weight: 0.0,
                    })
                })
                .collect();
            let run_scores: Vec<f64> = per_run.iter().map(|r| r.score).collect();
            let run_scores_normalized: Vec<f64> = per_run
                .iter()
                .map(|r| if r.weight > 0.0 { r.score / r.weight } else { 0.0 })
                .collect();
            let (mean_score, std_deviation) = compute_mean_std(&run_scores);
            let (mean_score_normalized, std_deviation_normalized) =
                compute_mean_std(&run_scores_normalized);
            let weight = per_run
                .iter()
                .map(|r| r.weight)
                .filter(|w| *w > 0.0)
                .fold(0.0, f64::max);

            let stats = CriticStats {
                run_scores,
                mean_score,
                std_deviation,
                run_scores_normalized,
                mean_score_normalized,
                std_deviation_normalized,
                weight,
            };
            (field.clone(), stats)
        })
        .collect()
}

/// Outcome of a single run, as reported under `run_stats.runs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetail {
    pub score: f64,
    pub passed: bool,
    pub warning: bool,
    pub failure_reason: Option<String>,
    pub details: Vec<FieldResult>,
}

/// Run-level statistics for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub num_runs: usize,
    pub scores: Vec<f64>,
    pub mean_score: f64,
    pub std_deviation: f64,
    pub passed: Vec<bool>,
    pub warned: Vec<bool>,
    pub seed_policy: String,
    pub run_seeds: Vec<Option<i64>>,
    pub pass_rule: String,
    pub runs: Vec<RunDetail>,
}

/// Aggregated result of running one case several times
#[derive(Debug, Clone, PartialEq)]
pub struct MultiRunOutcome {
    pub evaluation: EvaluationResult,
    pub predicted_tool_calls: Vec<ToolCall>,
    pub run_stats: RunStats,
    pub critic_stats: BTreeMap<String, CriticStats>,
}

/// One completed run: its processed calls and their evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub seed: Option<i64>,
    pub tool_calls: Vec<ToolCall>,
    pub evaluation: EvaluationResult,
}

/// Combine completed runs into one outcome.
///
/// The aggregate score is the mean of the run scores; field results come
/// from the final run, and its failure reason is kept only under the
/// `last` rule.
pub fn aggregate_runs(
    runs: Vec<RunRecord>,
    seed_policy: String,
    pass_rule: PassRule,
    rubric: &EvalRubric,
) -> MultiRunOutcome {
    let evaluations: Vec<EvaluationResult> = runs.iter().map(|r| r.evaluation.clone()).collect();
    let scores: Vec<f64> = evaluations.iter().map(|e| e.score).collect();
    let (mean_score, std_deviation) = compute_mean_std(&scores);
    let (passed, warning) = resolve_pass_rule(&evaluations, mean_score, pass_rule, rubric);

    let field_scores: Vec<_> = evaluations.iter().map(compute_run_field_scores).collect();
    let last = evaluations.last();

    let evaluation = EvaluationResult {
        score: mean_score,
        passed,
        warning,
        results: last.map(|e| e.results.clone()).unwrap_or_default(),
        failure_reason: match pass_rule {
            PassRule::Last => last.and_then(|e| e.failure_reason.clone()),
            _ => None,
        },
    };

    let run_stats = RunStats {
        num_runs: runs.len(),
        scores,
        mean_score,
        std_deviation,
        passed: evaluations.iter().map(|e| e.passed).collect(),
        warned: evaluations.iter().map(|e| e.warning).collect(),
        seed_policy,
        run_seeds: runs.iter().map(|r| r.seed).collect(),
        pass_rule: pass_rule.to_string(),
        runs: evaluations
            .iter()
            .map(|e| RunDetail {
                score: e.score,
                passed: e.passed,
                warning: e.warning,
                failure_reason: e.failure_reason.clone(),
                details: e.results.clone(),
            })
            .collect(),
    };

    MultiRunOutcome {
        evaluation,
        predicted_tool_calls: runs.last().map(|r| r.tool_calls.clone()).unwrap_or_default(),
        run_stats,
        critic_stats: aggregate_critic_stats(&field_scores),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critic::CriticScore;
    use serde_json::Value;

    fn run(score: f64, passed: bool, warning: bool) -> EvaluationResult {
        EvaluationResult {
            score,
            passed,
            warning,
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_policy_parsing() {
        assert_eq!("constant".parse::<SeedPolicy>().unwrap(), SeedPolicy::Constant);
        assert_eq!(" Random ".parse::<SeedPolicy>().unwrap(), SeedPolicy::Random);
        assert_eq!("123".parse::<SeedPolicy>().unwrap(), SeedPolicy::Custom(123));
        let err = "sometimes".parse::<SeedPolicy>().unwrap_err();
        assert!(err.to_string().contains("'constant', 'random', or an integer"));
    }

    #[test]
    fn test_constant_seeds_are_identical() {
        let (label, seeds) = SeedPolicy::Constant.run_seeds(4, 42, true);
        assert_eq!(label, "constant");
        assert_eq!(seeds, vec![Some(42); 4]);
    }

    #[test]
    fn test_random_seeds_are_in_range() {
        let (label, seeds) = SeedPolicy::Random.run_seeds(20, 42, true);
        assert_eq!(label, "random");
        assert_eq!(seeds.len(), 20);
        assert!(seeds
            .iter()
            .all(|s| matches!(s, Some(v) if (0..RANDOM_SEED_BOUND).contains(v))));
    }

    #[test]
    fn test_seeds_ignored_without_provider_support() {
        let (label, seeds) = SeedPolicy::Custom(7).run_seeds(3, 42, false);
        assert_eq!(label, "custom (ignored)");
        assert_eq!(seeds, vec![None, None, None]);
    }

    #[test]
    fn test_invalid_pass_rule_lists_valid_values() {
        let err = "best".parse::<PassRule>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("best"));
        assert!(msg.contains("last, majority, mean"));
    }

    #[test]
    fn test_mean_std_is_population() {
        let (mean, std) = compute_mean_std(&[1.0, 0.0]);
        assert_eq!(mean, 0.5);
        assert_eq!(std, 0.5);
        assert_eq!(compute_mean_std(&[0.7]), (0.7, 0.0));
        assert_eq!(compute_mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_majority_three_of_five_passes() {
        let runs = vec![
            run(1.0, true, false),
            run(0.0, false, false),
            run(1.0, true, false),
            run(0.0, false, false),
            run(1.0, true, false),
        ];
        let rubric = EvalRubric::default();
        assert_eq!(
            resolve_pass_rule(&runs, 0.6, PassRule::Majority, &rubric),
            (true, false)
        );
    }

    #[test]
    fn test_majority_counts_warnings_toward_warning() {
        let runs = vec![
            run(0.9, true, false),
            run(0.75, false, true),
            run(0.1, false, false),
            run(0.75, false, true),
        ];
        let rubric = EvalRubric::default();
        assert_eq!(
            resolve_pass_rule(&runs, 0.6, PassRule::Majority, &rubric),
            (false, true)
        );
    }

    #[test]
    fn test_mean_and_last_rules() {
        let runs = vec![run(1.0, true, false), run(0.5, false, false)];
        let rubric = EvalRubric::default();
        assert_eq!(
            resolve_pass_rule(&runs, 0.75, PassRule::Last, &rubric),
            (false, false)
        );
        assert_eq!(
            resolve_pass_rule(&runs, 0.85, PassRule::Mean, &rubric),
            (true, false)
        );
        assert_eq!(
            resolve_pass_rule(&[], 1.0, PassRule::Mean, &rubric),
            (false, false)
        );
    }

    #[test]
    fn test_critic_stats_treat_missing_fields_as_zero() {
        let mut first = EvaluationResult::default();
        first.add("query", CriticScore::full(0.5), 0.5, Value::Null, Value::Null);
        first.add(TOOL_SELECTION_FIELD, CriticScore::full(1.0), 1.0, Value::Null, Value::Null);
        let second = EvaluationResult::default();

        let per_run = vec![
            compute_run_field_scores(&first),
            compute_run_field_scores(&second),
        ];
        let stats = aggregate_critic_stats(&per_run);

        assert!(!stats.contains_key(TOOL_SELECTION_FIELD));
        let query = &stats["query"];
        assert_eq!(query.run_scores, vec![0.5, 0.0]);
        assert_eq!(query.run_scores_normalized, vec![1.0, 0.0]);
        assert_eq!(query.mean_score_normalized, 0.5);
        assert_eq!(query.weight, 0.5);
    }

    #[test]
    fn test_aggregate_runs_keeps_last_failure_reason_only_for_last_rule() {
        let records = vec![
            RunRecord {
                seed: Some(42),
                tool_calls: Vec::new(),
                evaluation: run(1.0, true, false),
            },
            RunRecord {
                seed: Some(42),
                tool_calls: Vec::new(),
                evaluation: EvaluationResult::failed("wrong tool".into()),
            },
        ];

        let last = aggregate_runs(records.clone(), "constant".into(), PassRule::Last, &EvalRubric::default());
        assert_eq!(last.evaluation.score, 0.5);
        assert!(!last.evaluation.passed);
        assert_eq!(last.evaluation.failure_reason.as_deref(), Some("wrong tool"));
        assert_eq!(last.run_stats.run_seeds, vec![Some(42), Some(42)]);
        assert_eq!(last.run_stats.std_deviation, 0.5);

        let mean = aggregate_runs(records, "constant".into(), PassRule::Mean, &EvalRubric::default());
        assert!(mean.evaluation.failure_reason.is_none());
        assert_eq!(mean.run_stats.pass_rule, "mean");
    }
}
