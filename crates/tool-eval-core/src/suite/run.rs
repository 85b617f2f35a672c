use super::report::{CaptureResult, CapturedCase, CaseReport, SuiteReport};
use super::EvalSuite;
use crate::case::{EvalCase, ToolCall};
use crate::error::{EvalError, Result};
use crate::model::{build_messages, ModelClient, ModelRequest};
use crate::multirun::{aggregate_runs, RunOptions, RunRecord};
use crate::registry::ToolRegistry;
use crate::trace_time;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// State shared read-only by every case task of one run
struct RunContext {
    suite: EvalSuite,
    model: Arc<dyn ModelClient>,
    model_name: String,
    tools: Vec<Value>,
    options: RunOptions,
}

impl RunContext {
    async fn invoke(
        &self,
        case: &EvalCase,
        run_index: usize,
        seed: Option<i64>,
    ) -> Result<Vec<ToolCall>> {
        let request = ModelRequest {
            model: self.model_name.clone(),
            case_name: case.name.clone(),
            user_message: case.user_message.clone(),
            run_index,
            messages: build_messages(
                &case.system_message,
                &case.additional_messages,
                &case.user_message,
            ),
            tools: self.tools.clone(),
            seed,
        };
        debug!(case = %case.name, run_index, ?seed, "invoking model");
        let calls = self.model.complete(&request).await?;
        Ok(self.suite.process_tool_calls(calls))
    }

    /// Run one case `num_runs` times, sequentially, and aggregate
    async fn run_case(&self, case: &EvalCase) -> Result<CaseReport> {
        let start = Instant::now();
        let num_runs = self.options.num_runs;
        let (seed_policy, seeds) = self.options.seed.run_seeds(
            num_runs,
            self.options.default_seed,
            self.model.supports_seed(),
        );

        let mut runs = Vec::with_capacity(num_runs);
        for (run_index, seed) in seeds.into_iter().enumerate() {
            let tool_calls = self.invoke(case, run_index, seed).await?;
            let evaluation = case.evaluate(&tool_calls);
            runs.push(RunRecord {
                seed,
                tool_calls,
                evaluation,
            });
        }

        let outcome = aggregate_runs(runs, seed_policy, self.options.pass_rule, &case.rubric);
        debug!(
            case = %case.name,
            score = outcome.evaluation.score,
            passed = outcome.evaluation.passed,
            "case complete"
        );

        let mut report =
            CaseReport::for_case(case, outcome.predicted_tool_calls, outcome.evaluation);
        if num_runs > 1 {
            report.run_stats = Some(outcome.run_stats);
            if !outcome.critic_stats.is_empty() {
                report.critic_stats = Some(outcome.critic_stats);
            }
        }
        trace_time!(start, "run_case", case = case.name.as_str());
        Ok(report)
    }

    async fn capture_case(&self, case: &EvalCase, include_context: bool) -> Result<CapturedCase> {
        let tool_calls = self.invoke(case, 0, None).await?;
        Ok(CapturedCase {
            case_name: case.name.clone(),
            user_message: case.user_message.clone(),
            tool_calls,
            system_message: include_context.then(|| case.system_message.clone()),
            additional_messages: include_context.then(|| case.additional_messages.clone()),
            error: None,
        })
    }
}

/// Run `task` for every case with at most `max_concurrent` in flight.
///
/// Results come back in case order. A task that fails or panics is handed
/// to `on_error` together with its case; it never affects other tasks.
async fn for_each_case<T, F, Fut, E>(
    ctx: Arc<RunContext>,
    task: F,
    on_error: E,
) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(Arc<RunContext>, usize) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    E: Fn(&EvalCase, String) -> T,
{
    let semaphore = Arc::new(Semaphore::new(ctx.suite.max_concurrent));
    let mut handles = Vec::with_capacity(ctx.suite.cases.len());

    for index in 0..ctx.suite.cases.len() {
        let semaphore = Arc::clone(&semaphore);
        let work = task(Arc::clone(&ctx), index);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| EvalError::Other(format!("case scheduler closed: {e}")))?;
            work.await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (case, handle) in ctx.suite.cases.iter().zip(handles) {
        let result = match handle.await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(case = %case.name, error = %e, "case failed");
                on_error(case, e.to_string())
            }
            Err(join_error) => {
                warn!(case = %case.name, error = %join_error, "case task aborted");
                on_error(case, format!("case task aborted: {join_error}"))
            }
        };
        results.push(result);
    }
    results
}

impl EvalSuite {
    /// Tool list sent with every request; fails when nothing is registered
    pub fn model_tools(&self) -> Result<Vec<Value>> {
        if self.tool_count() == 0 {
            return Err(EvalError::NoToolsRegistered);
        }
        self.registry.list_tools_for_model("openai")
    }

    fn context(
        &self,
        model: Arc<dyn ModelClient>,
        model_name: &str,
        options: RunOptions,
    ) -> Result<Arc<RunContext>> {
        options.validate()?;
        if self.max_concurrent < 1 {
            return Err(EvalError::invalid_value(
                "max_concurrent",
                format!("{} (must be >= 1)", self.max_concurrent),
            ));
        }
        let tools = self.model_tools()?;
        Ok(Arc::new(RunContext {
            suite: self.clone(),
            model,
            model_name: model_name.to_string(),
            tools,
            options,
        }))
    }

    /// Evaluate every case against `model`.
    ///
    /// Configuration problems fail the whole run before any model call.
    /// Failures inside a case are recorded on that case's report.
    pub async fn run(
        &self,
        model: Arc<dyn ModelClient>,
        model_name: &str,
        options: RunOptions,
    ) -> Result<SuiteReport> {
        let start = Instant::now();
        let ctx = self.context(model, model_name, options)?;
        let provider = ctx.model.provider().to_string();
        debug!(
            suite = %self.name,
            cases = self.cases.len(),
            num_runs = options.num_runs,
            max_concurrent = self.max_concurrent,
            "run"
        );

        let cases = for_each_case(
            Arc::clone(&ctx),
            |ctx, index| async move { ctx.run_case(&ctx.suite.cases[index]).await },
            CaseReport::errored,
        )
        .await;

        trace_time!(start, "suite_run", suite = self.name.as_str());
        Ok(SuiteReport {
            suite_name: self.name.clone(),
            model: model_name.to_string(),
            provider,
            rubric: self.rubric,
            cases,
        })
    }

    /// Record the processed tool calls of every case without scoring
    pub async fn capture(
        &self,
        model: Arc<dyn ModelClient>,
        model_name: &str,
        include_context: bool,
    ) -> Result<CaptureResult> {
        let ctx = self.context(model, model_name, RunOptions::default())?;
        let provider = ctx.model.provider().to_string();

        let captured_cases = for_each_case(
            Arc::clone(&ctx),
            move |ctx, index| async move {
                ctx.capture_case(&ctx.suite.cases[index], include_context)
                    .await
            },
            |case, error| CapturedCase {
                case_name: case.name.clone(),
                user_message: case.user_message.clone(),
                tool_calls: Vec::new(),
                system_message: None,
                additional_messages: None,
                error: Some(error),
            },
        )
        .await;

        Ok(CaptureResult {
            suite_name: self.name.clone(),
            model: model_name.to_string(),
            provider,
            captured_cases,
        })
    }
}
