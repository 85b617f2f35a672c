//! Human-readable rendering of suite reports and captures

use serde_json::Value;
use tool_eval_core::suite::{CaptureResult, CaseReport, SuiteReport};

fn status(case: &CaseReport) -> &'static str {
    if case.error.is_some() {
        "ERROR"
    } else if case.evaluation.passed {
        "PASSED"
    } else if case.evaluation.warning {
        "WARNED"
    } else {
        "FAILED"
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// One line per case, details for anything that did not pass, then a summary
pub fn print_report(report: &SuiteReport, quiet: bool) {
    if !quiet {
        println!(
            "Suite: {} (model: {}, provider: {})",
            report.suite_name, report.model, report.provider
        );
        for case in &report.cases {
            print_case(case);
        }
        println!();
    }

    println!("{}", summary_line(report));
}

fn print_case(case: &CaseReport) {
    if let Some(error) = &case.error {
        println!("{:<7} {}: {}", status(case), case.name, error);
        return;
    }

    println!(
        "{:<7} {} (score {:.2})",
        status(case),
        case.name,
        case.evaluation.score
    );
    if let Some(stats) = &case.run_stats {
        println!(
            "        mean {:.2}, std {:.2} over {} runs ({} rule, seed {})",
            stats.mean_score, stats.std_deviation, stats.num_runs, stats.pass_rule, stats.seed_policy
        );
    }
    if case.evaluation.passed {
        return;
    }
    if let Some(reason) = &case.evaluation.failure_reason {
        println!("        {reason}");
    }
    for field in case.evaluation.results.iter().filter(|f| !f.matched) {
        println!(
            "        {}: expected {}, got {} ({:.2}/{:.2})",
            field.field,
            compact(&field.expected),
            compact(&field.actual),
            field.score,
            field.weight
        );
    }
}

fn summary_line(report: &SuiteReport) -> String {
    let mut line = format!(
        "{} passed, {} warned, {} failed of {} cases",
        report.passed_count(),
        report.warned_count(),
        report.failed_count(),
        report.cases.len()
    );
    let errored = report.errored_count();
    if errored > 0 {
        line.push_str(&format!(" ({errored} errored)"));
    }
    line
}

pub fn print_capture(result: &CaptureResult) {
    println!(
        "Suite: {} (model: {}, provider: {})",
        result.suite_name, result.model, result.provider
    );
    for case in &result.captured_cases {
        println!("{}", case.case_name);
        if let Some(error) = &case.error {
            println!("  error: {error}");
            continue;
        }
        if case.tool_calls.is_empty() {
            println!("  (no tool calls)");
        }
        for call in &case.tool_calls {
            println!("  {}({})", call.name, Value::Object(call.args.clone()));
        }
    }
}
