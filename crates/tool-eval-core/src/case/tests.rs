use super::*;
use crate::critic::{FuzzyWeight, NumericCritic};
use crate::error::CriticError;
use serde_json::json;

fn args(value: Value) -> Args {
    value.as_object().cloned().unwrap_or_default()
}

fn call(name: &str, value: Value) -> ToolCall {
    ToolCall::new(name, args(value))
}

fn email_case(critics: Vec<Critic>) -> EvalCase {
    EvalCase::new(
        "send email",
        "Email Bob about the launch",
        vec![call(
            "Google.SendEmail",
            json!({"recipient": "bob@example.com", "subject": "Launch"}),
        )],
        critics,
    )
    .unwrap()
}

#[test]
fn test_trivial_empty_case_passes() {
    let case = EvalCase::new("nothing", "hello", Vec::new(), Vec::new()).unwrap();
    let result = case.evaluate(&[]);
    assert_eq!(result.score, 1.0);
    assert!(result.passed);
    assert!(result.failure_reason.is_none());
}

#[test]
fn test_quantity_mismatch_short_circuits() {
    let case = EvalCase::new(
        "two calls",
        "do two things",
        vec![call("A.One", json!({})), call("A.Two", json!({}))],
        Vec::new(),
    )
    .unwrap();
    let result = case.evaluate(&[call("A.One", json!({}))]);

    assert_eq!(result.score, 0.0);
    assert!(!result.passed);
    assert!(result.fail());
    let reason = result.failure_reason.unwrap();
    assert!(reason.contains("Expected 2"), "{reason}");
    assert!(reason.contains("got 1"), "{reason}");
    assert!(reason.contains("A.One, A.Two"));
    assert!(result.results.is_empty());
}

#[test]
fn test_quantity_check_can_be_disabled() {
    let rubric = EvalRubric {
        fail_on_tool_call_quantity: false,
        fail_on_tool_selection: false,
        ..Default::default()
    };
    let case = email_case(vec![Critic::binary("recipient", 1.0)]).with_rubric(rubric);
    let result = case.evaluate(&[
        call("Google.SendEmail", json!({"recipient": "bob@example.com"})),
        call("Google.ListEmails", json!({})),
    ]);
    assert!(result.failure_reason.is_none());
    assert_eq!(result.score, 1.0);
}

#[test]
fn test_selection_mismatch_short_circuits() {
    let case = email_case(vec![Critic::binary("recipient", 1.0)]);
    let result = case.evaluate(&[call("Google.ListEmails", json!({}))]);
    assert_eq!(result.score, 0.0);
    let reason = result.failure_reason.unwrap();
    assert!(reason.starts_with("Tool selection mismatch"));
    assert!(reason.contains("Google.SendEmail"));
    assert!(reason.contains("Google.ListEmails"));
}

#[test]
fn test_selection_ignores_separators_and_order() {
    let case = EvalCase::new(
        "two",
        "both",
        vec![call("Slack.Send", json!({})), call("Jira.Create", json!({}))],
        Vec::new(),
    )
    .unwrap();
    assert!(!case.check_tool_selection_failure(&["jira_create", "Slack_Send"]));
    assert!(case.check_tool_selection_failure(&["Jira_Create", "Slack_Delete"]));
}

#[test]
fn test_no_critics_scores_full_after_checks() {
    let case = EvalCase::new("sel", "go", vec![call("A.Go", json!({}))], Vec::new()).unwrap();
    let result = case.evaluate(&[call("A_Go", json!({"x": 1}))]);
    assert_eq!(result.score, 1.0);
    assert!(result.passed);
}

#[test]
fn test_weighted_scoring() {
    let case = email_case(vec![
        Critic::binary("recipient", 0.5),
        Critic::binary("subject", 0.5),
    ]);
    let result = case.evaluate(&[call(
        "Google_SendEmail",
        json!({"recipient": "bob@example.com", "subject": "Other"}),
    )]);

    // tool selection 1.0 + recipient 0.5 over total weight 2.0
    assert!((result.score - 0.75).abs() < 1e-9);
    assert!(!result.passed);
    assert_eq!(result.results.len(), 3);
    assert_eq!(result.results[0].field, TOOL_SELECTION_FIELD);
    assert!(result.results[0].matched);
    assert!(!result.results[2].matched);
}

#[test]
fn test_warning_classification() {
    let rubric = EvalRubric {
        fail_threshold: 0.9,
        warn_threshold: 0.7,
        ..Default::default()
    };
    let case = email_case(vec![
        Critic::binary("recipient", 0.5),
        Critic::binary("subject", 0.5),
    ])
    .with_rubric(rubric);
    let result = case.evaluate(&[call(
        "Google.SendEmail",
        json!({"recipient": "bob@example.com", "subject": "Other"}),
    )]);
    assert!(!result.passed);
    assert!(result.warning);
    assert!(result.warn());
    assert!(!result.fail());
}

#[test]
fn test_optimal_assignment_beats_positional_order() {
    let case = EvalCase::new(
        "two searches",
        "search twice",
        vec![
            call("Web.Search", json!({"query": "rust"})),
            call("Web.Search", json!({"query": "tokio"})),
        ],
        vec![Critic::binary("query", 1.0)],
    )
    .unwrap();
    let result = case.evaluate(&[
        call("Web.Search", json!({"query": "tokio"})),
        call("Web.Search", json!({"query": "rust"})),
    ]);
    assert_eq!(result.score, 1.0);
    assert!(result.passed);
}

#[test]
fn test_critic_error_is_isolated_to_its_field() {
    let flaky = Critic::custom_fn("subject", 1.0, |_, _, _| {
        Err(CriticError::Failed("comparison exploded".into()))
    });
    let case = email_case(vec![Critic::binary("recipient", 1.0), flaky]);
    let result = case.evaluate(&[call(
        "Google.SendEmail",
        json!({"recipient": "bob@example.com", "subject": "Launch"}),
    )]);

    let subject = result.results.iter().find(|r| r.field == "subject").unwrap();
    assert!(!subject.matched);
    assert_eq!(subject.score, 0.0);
    assert_eq!(subject.weight, 1.0);

    let recipient = result.results.iter().find(|r| r.field == "recipient").unwrap();
    assert!(recipient.matched);
    assert_eq!(result.score, 1.0);
    assert!(result.passed);
}

#[test]
fn test_failed_critic_does_not_dilute_remaining_fields() {
    let flaky = Critic::custom_fn("subject", 1.0, |_, _, _| {
        Err(CriticError::Failed("comparison exploded".into()))
    });
    let case = email_case(vec![Critic::binary("recipient", 1.0), flaky]);
    let result = case.evaluate(&[call(
        "Google.SendEmail",
        json!({"recipient": "alice@example.com", "subject": "Launch"}),
    )]);

    // tool selection 1 of 1, recipient 0 of 1, subject excluded
    assert!((result.score - 0.5).abs() < 1e-9);
    assert!(!result.passed);
}

#[test]
fn test_missing_actual_argument_is_null() {
    let case = email_case(vec![Critic::numeric(
        "subject",
        1.0,
        NumericCritic::new(0.0, 1.0),
    )]);
    let result = case.evaluate(&[call("Google.SendEmail", json!({}))]);
    let subject = result.results.iter().find(|r| r.field == "subject").unwrap();
    assert_eq!(subject.actual, Value::Null);
    assert!(!subject.matched);
}

#[test]
fn test_score_stays_within_bounds() {
    let generous = Critic::custom_fn("recipient", 1.0, |_, _, w| {
        Ok(CriticScore::full(w * 10.0))
    });
    let case = email_case(vec![generous]);
    let result = case.evaluate(&[call("Google.SendEmail", json!({"recipient": "x"}))]);
    assert!((0.0..=1.0).contains(&result.score));
}

#[test]
fn test_padding_never_adds_weight() {
    let rubric = EvalRubric {
        fail_on_tool_call_quantity: false,
        fail_on_tool_selection: false,
        ..Default::default()
    };
    let case = email_case(vec![Critic::binary("recipient", 1.0)]).with_rubric(rubric);
    let actual = [
        call("Google.SendEmail", json!({"recipient": "bob@example.com"})),
        call("Other.Tool", json!({})),
        call("Other.Tool", json!({})),
    ];
    let result = case.evaluate(&actual);

    // one real pair: selection + recipient
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.score, 1.0);
}

#[test]
fn test_duplicate_critic_fields_rejected() {
    let err = EvalCase::new(
        "dup",
        "x",
        Vec::new(),
        vec![Critic::binary("a", 1.0), Critic::binary("a", 0.5)],
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("'a'"));
    assert!(msg.contains("'dup'"));
}

#[test]
fn test_fuzzy_weights_are_normalized_on_construction() {
    let case = email_case(vec![
        Critic::binary("recipient", FuzzyWeight::Critical),
        Critic::binary("subject", FuzzyWeight::Low),
    ]);
    let total: f64 = case.critics.iter().map(|c| c.resolved_weight()).sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn test_add_none_critics_covers_uncovered_fields() {
    let expected = vec![call("A.B", json!({"x": 1, "y": 2})), call("A.C", json!({"y": 3, "z": 4}))];
    let critics = add_none_critics(&expected, vec![Critic::binary("y", 1.0)]);
    let fields: Vec<&str> = critics.iter().map(|c| c.critic_field()).collect();
    assert_eq!(fields, vec!["y", "x", "z"]);
    assert_eq!(critics[1].kind().name(), "none");
}
