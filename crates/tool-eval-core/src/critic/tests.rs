use super::*;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_binary_exact_match_scores_full_weight() {
    let critic = Critic::binary("project", 0.5);
    let result = critic.evaluate(&json!("ENG"), &json!("ENG")).unwrap();
    assert!(result.matched);
    assert_eq!(result.score, 0.5);
}

#[test]
fn test_binary_mismatch_scores_zero() {
    let critic = Critic::binary("project", 0.5);
    let result = critic.evaluate(&json!("ENG"), &json!("OPS")).unwrap();
    assert!(!result.matched);
    assert_eq!(result.score, 0.0);
}

#[test]
fn test_binary_coerces_actual_to_expected_type() {
    let critic = Critic::binary("limit", 1.0);
    assert!(critic.evaluate(&json!(5), &json!("5")).unwrap().matched);
    assert!(critic.evaluate(&json!(5), &json!(5.0)).unwrap().matched);
    assert!(critic.evaluate(&json!(true), &json!("True")).unwrap().matched);
    assert!(critic.evaluate(&json!("10"), &json!(10)).unwrap().matched);
    assert!(!critic.evaluate(&json!(5), &json!("five")).unwrap().matched);
}

#[test]
fn test_binary_compares_nested_structures() {
    let critic = Critic::binary("labels", 1.0);
    let result = critic
        .evaluate(&json!(["bug", {"p": 1}]), &json!(["bug", {"p": 1.0}]))
        .unwrap();
    assert!(result.matched);
}

#[test]
fn test_numeric_is_monotonic_in_distance() {
    let critic = Critic::numeric("amount", 1.0, NumericCritic::new(0.0, 100.0));
    let expected = json!(50);
    let mut previous = f64::INFINITY;
    for actual in [50, 52, 55, 60, 75, 90, 100] {
        let score = critic.evaluate(&expected, &json!(actual)).unwrap().score;
        assert!(score <= previous, "score rose at {actual}: {score} > {previous}");
        previous = score;
    }
}

#[test]
fn test_numeric_match_threshold() {
    let critic = Critic::numeric("amount", 2.0, NumericCritic::new(0.0, 10.0));
    let close = critic.evaluate(&json!(5), &json!(6)).unwrap();
    assert!(close.matched);
    assert!((close.score - 1.8).abs() < 1e-9);

    let far = critic.evaluate(&json!(5), &json!(8)).unwrap();
    assert!(!far.matched);
    assert!((far.score - 1.4).abs() < 1e-9);
}

#[test]
fn test_numeric_tolerance_gives_full_score() {
    let critic = Critic::numeric(
        "amount",
        1.0,
        NumericCritic::new(0.0, 100.0).with_tolerance(0.05),
    );
    let result = critic.evaluate(&json!(50), &json!(54)).unwrap();
    assert_eq!(result.score, 1.0);
}

#[test]
fn test_numeric_accepts_numeric_strings() {
    let critic = Critic::numeric("amount", 1.0, NumericCritic::new(0.0, 10.0));
    assert_eq!(critic.evaluate(&json!(3), &json!("3")).unwrap().score, 1.0);
}

#[test]
fn test_numeric_rejects_non_numbers() {
    let critic = Critic::numeric("amount", 1.0, NumericCritic::new(0.0, 10.0));
    let err = critic.evaluate(&json!(3), &json!("three")).unwrap_err();
    assert!(matches!(err, CriticError::NotNumeric { .. }));
}

#[test]
fn test_numeric_rejects_degenerate_range() {
    let critic = Critic::numeric("amount", 1.0, NumericCritic::new(5.0, 5.0));
    let err = critic.evaluate(&json!(5), &json!(5)).unwrap_err();
    assert!(matches!(err, CriticError::Config(_)));
}

#[test]
fn test_datetime_within_tolerance_is_full_match() {
    let critic = Critic::datetime("due", 1.0, DatetimeCritic::default());
    let result = critic
        .evaluate(&json!("2024-03-01T10:00:00Z"), &json!("2024-03-01T10:05:00Z"))
        .unwrap();
    assert!(result.matched);
    assert_eq!(result.score, 1.0);
}

#[test]
fn test_datetime_is_monotonic_between_tolerance_and_max() {
    let critic = Critic::datetime("due", 1.0, DatetimeCritic::default());
    let expected = json!("2024-03-01T10:00:00Z");
    let mut previous = f64::INFINITY;
    for actual in [
        "2024-03-01T10:00:00Z",
        "2024-03-01T10:20:00Z",
        "2024-03-01T10:45:00Z",
        "2024-03-01T11:30:00Z",
        "2024-03-01T12:00:00Z",
        "2024-03-02T12:00:00Z",
    ] {
        let score = critic.evaluate(&expected, &json!(actual)).unwrap().score;
        assert!(score <= previous, "score rose at {actual}");
        previous = score;
    }
    assert_eq!(previous, 0.0);
}

#[test]
fn test_datetime_partial_score_is_not_a_match() {
    let critic = Critic::datetime("due", 1.0, DatetimeCritic::default());
    let result = critic
        .evaluate(&json!("2024-03-01T10:00:00Z"), &json!("2024-03-01T11:00:00Z"))
        .unwrap();
    assert!(!result.matched);
    assert!(result.score > 0.0 && result.score < 1.0);
}

#[test]
fn test_datetime_naive_values_are_utc() {
    let critic = Critic::datetime(
        "due",
        1.0,
        DatetimeCritic::new(Duration::from_secs(60), Duration::from_secs(3600)),
    );
    let result = critic
        .evaluate(&json!("2024-03-01 10:00:00"), &json!("2024-03-01T10:00:00+00:00"))
        .unwrap();
    assert!(result.matched);

    let date_only = critic
        .evaluate(&json!("2024-03-01"), &json!("2024-03-01T00:00:30Z"))
        .unwrap();
    assert!(date_only.matched);
}

#[test]
fn test_datetime_rejects_garbage() {
    let critic = Critic::datetime("due", 1.0, DatetimeCritic::default());
    let err = critic
        .evaluate(&json!("next tuesday"), &json!("2024-03-01"))
        .unwrap_err();
    assert!(matches!(err, CriticError::InvalidDatetime { .. }));
}

#[test]
fn test_similarity_identical_text_matches() {
    let critic = Critic::similarity("title", 1.0, SimilarityCritic::default());
    let result = critic
        .evaluate(&json!("Fix login timeout"), &json!("fix login timeout"))
        .unwrap();
    assert!(result.matched);
    assert!((result.score - 1.0).abs() < 1e-9);
}

#[test]
fn test_similarity_unrelated_text_does_not_match() {
    let critic = Critic::similarity("title", 1.0, SimilarityCritic::default());
    let result = critic
        .evaluate(&json!("Fix login timeout"), &json!("Quarterly budget review"))
        .unwrap();
    assert!(!result.matched);
    assert_eq!(result.score, 0.0);
}

#[test]
fn test_similarity_threshold_controls_match() {
    let lenient = SimilarityCritic::default().with_threshold(0.3);
    let critic = Critic::similarity("title", 1.0, lenient);
    let result = critic
        .evaluate(
            &json!("fix login bug on mobile"),
            &json!("fix login bug on desktop"),
        )
        .unwrap();
    assert!(result.matched);
}

#[test]
fn test_none_critic_always_matches() {
    let critic = Critic::none("notes");
    let result = critic.evaluate(&json!("a"), &json!(null)).unwrap();
    assert!(result.matched);
    assert_eq!(result.score, 0.0);
}

#[test]
fn test_custom_critic_errors_surface_to_caller() {
    let critic = Critic::custom_fn("flaky", 1.0, |_, _, _| {
        Err(CriticError::Failed("boom".into()))
    });
    let err = critic.evaluate(&json!(1), &json!(1)).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(critic.kind().name(), "custom");
}

#[test]
fn test_value_as_text_joins_arrays() {
    assert_eq!(value_as_text(&json!(["a", "b", 3])), "a b 3");
    assert_eq!(value_as_text(&json!(null)), "");
}
