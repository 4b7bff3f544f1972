//! Filter Semantics Tests
//!
//! Tests for filter engine invariants:
//! - Boolean patterns are ANDed and preserve input order
//! - Comparisons are loose: numeric strings compare as numbers
//! - Membership lists are parsed once per literal
//! - Fulltext scoring never drops rows and is weighted by share

use rowsift::filter::{Comparison, FilterEngine, FilterError, Matcher, MembershipCache, Pattern};
use rowsift::value::{Record, Row};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Object(fields) => Row::Columns(Record::new(fields)),
            other => Row::Scalar(other),
        })
        .collect()
}

fn games() -> Vec<Row> {
    rows(vec![
        json!({"id": 1, "title": "Mario Kart", "console": "nintendo"}),
        json!({"id": 2, "title": "Halo", "console": "xbox"}),
        json!({"id": 3, "title": "Zelda", "console": "nintendo"}),
        json!({"id": 4, "title": "Uncharted", "console": "playstation"}),
        json!({"id": 5, "title": "Metroid", "console": "Nintendo"}),
        json!({"id": 6, "title": "Pikmin", "console": "nintendo"}),
    ])
}

fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter().filter_map(|r| r.id().and_then(Value::as_i64)).collect()
}

fn annotation(row: &Row, name: &str) -> f64 {
    row.as_record()
        .and_then(|r| r.value(name))
        .and_then(|v| v.as_f64())
        .unwrap()
}

fn engine(patterns: &[&str]) -> FilterEngine {
    let mut engine = FilterEngine::new();
    for text in patterns {
        engine.add_pattern(Pattern::parse(text, None).unwrap());
    }
    engine
}

// =============================================================================
// Boolean Pattern Tests
// =============================================================================

/// Equality plus an upper bound keeps matching rows in input order.
#[test]
fn test_nintendo_below_five() {
    let mut engine = engine(&["console = nintendo", "id < 5"]);
    let out = engine.process(games(), None).unwrap();
    assert_eq!(ids(&out), vec![1, 3]);
}

/// Equality is case-sensitive; LIKE is not.
#[test]
fn test_equality_is_case_sensitive_like_is_not() {
    let mut eq = engine(&["console = nintendo"]);
    assert_eq!(ids(&eq.process(games(), None).unwrap()), vec![1, 3, 6]);

    let mut like = engine(&["console LIKE NINTEN"]);
    assert_eq!(ids(&like.process(games(), None).unwrap()), vec![1, 3, 5, 6]);
}

/// No patterns leaves rows untouched.
#[test]
fn test_no_patterns_is_identity() {
    let mut engine = FilterEngine::new();
    assert_eq!(engine.process(games(), None).unwrap(), games());
}

/// A missing column is null, and null loosely equals the empty string.
#[test]
fn test_missing_column_is_null() {
    let mut engine = engine(&["rating = "]);
    let out = engine.process(games(), None).unwrap();
    assert_eq!(out.len(), 6);
}

/// Numeric strings compare numerically.
#[test]
fn test_numeric_strings_compare_as_numbers() {
    let input = rows(vec![
        json!({"id": 1, "price": "10"}),
        json!({"id": 2, "price": "9"}),
        json!({"id": 3, "price": "100"}),
    ]);
    let mut engine = engine(&["price > 9.5"]);
    assert_eq!(ids(&engine.process(input, None).unwrap()), vec![1, 3]);
}

/// NOT IN excludes listed members.
#[test]
fn test_not_in() {
    let mut engine = engine(&["id NOT IN 2, 4 ,'6'"]);
    assert_eq!(ids(&engine.process(games(), None).unwrap()), vec![1, 3, 5]);
}

// =============================================================================
// Single-Column Tests
// =============================================================================

/// Membership on a single-column result keeps input order.
#[test]
fn test_single_column_membership_preserves_order() {
    let mut engine = engine(&["IN 1,2,3"]);
    let out = engine
        .process(rows(vec![json!(1), json!(4), json!(2), json!(9), json!(3)]), None)
        .unwrap();
    assert_eq!(out, rows(vec![json!(1), json!(2), json!(3)]));
}

/// Fulltext on a single-column result fails before any evaluation.
#[test]
fn test_single_column_fulltext_rejected() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::new("id", Comparison::In, "1"));
    engine.add_pattern(Pattern::fulltext("title", "halo", 1.0));

    let result = engine.process(rows(vec![json!("Halo"), json!("Zelda")]), None);
    assert_eq!(result, Err(FilterError::FullTextOnSingleColumn));
    assert!(engine.cache().is_empty());
}

// =============================================================================
// Membership Cache Tests
// =============================================================================

/// One list build for many rows.
#[test]
fn test_membership_list_built_once() {
    let mut engine = engine(&["id IN 1,3,5"]);
    let many: Vec<Row> = (0..1000).map(|i| rows(vec![json!({"id": i % 7})]).remove(0)).collect();

    let out = engine.process(many, None).unwrap();
    assert!(!out.is_empty());
    assert_eq!(engine.cache().builds(), 1);

    // Reprocessing reuses the list
    engine.process(games(), None).unwrap();
    assert_eq!(engine.cache().builds(), 1);
}

/// Matcher shares a caller-owned cache.
#[test]
fn test_matcher_with_external_cache() {
    let mut cache = MembershipCache::new();
    let pattern = Pattern::new("id", Comparison::In, "a, b");

    assert!(Matcher::matches(&json!("a"), &pattern, &mut cache).unwrap());
    assert!(Matcher::matches(&json!("b"), &pattern, &mut cache).unwrap());
    assert!(!Matcher::matches(&json!("c"), &pattern, &mut cache).unwrap());
    assert_eq!(cache.builds(), 1);
}

/// Fulltext is not a predicate.
#[test]
fn test_matcher_rejects_fulltext() {
    let mut cache = MembershipCache::new();
    let pattern = Pattern::fulltext("title", "x", 1.0);
    assert!(matches!(
        Matcher::matches(&json!("x"), &pattern, &mut cache),
        Err(FilterError::NotAPredicate(_))
    ));
}

// =============================================================================
// Fulltext Scoring Tests
// =============================================================================

/// Fulltext never drops rows.
#[test]
fn test_fulltext_keeps_every_row() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::fulltext("title", "zzzzzzzz", 1.0));
    let out = engine.process(games(), None).unwrap();
    assert_eq!(ids(&out), vec![1, 2, 3, 4, 5, 6]);
    assert!(out.iter().all(|r| annotation(r, "score") >= 0.0));
}

/// Exact and disjoint operands.
#[test]
fn test_edit_percent_bounds() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::fulltext("code", "a", 1.0));
    let out = engine
        .process(rows(vec![json!({"code": "a"}), json!({"code": "b"})]), None)
        .unwrap();

    assert_eq!(annotation(&out[0], "code_score"), 100.0);
    assert_eq!(annotation(&out[1], "code_score"), 0.0);
}

/// Weights split the aggregate score by share.
#[test]
fn test_weighted_score() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::fulltext("title", "abcd", 30.0));
    engine.add_pattern(Pattern::fulltext("body", "wxyz", 70.0));

    let out = engine
        .process(rows(vec![json!({"title": "abcd", "body": "wxzz"})]), None)
        .unwrap();

    let (p1, p2) = (annotation(&out[0], "title_score"), annotation(&out[0], "body_score"));
    assert_eq!((p1, p2), (100.0, 75.0));
    assert!((annotation(&out[0], "score") - (0.3 * p1 + 0.7 * p2)).abs() < 1e-9);
}

/// Explicit total weight overrides the declared sum.
#[test]
fn test_explicit_total_weight() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::fulltext("title", "abcd", 1.0));

    let out = engine
        .process(rows(vec![json!({"title": "abcd"})]), Some(4.0))
        .unwrap();
    assert_eq!(annotation(&out[0], "score"), 25.0);
}

/// Scoring the same input twice gives the same output.
#[test]
fn test_scoring_is_idempotent() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::fulltext("title", "zelda", 2.0));
    engine.add_pattern(Pattern::parse("console = nintendo", None).unwrap());

    let first = engine.process(games(), None).unwrap();
    let second = engine.process(games(), None).unwrap();
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![1, 3, 6]);
}

/// Annotations serialize after the real columns.
#[test]
fn test_annotations_serialize() {
    let mut engine = FilterEngine::new();
    engine.add_pattern(Pattern::fulltext("title", "Halo", 1.0));
    let out = engine
        .process(rows(vec![json!({"id": 2, "title": "Halo"})]), None)
        .unwrap();

    let json = serde_json::to_string(&out[0]).unwrap();
    assert_eq!(json, r#"{"id":2,"title":"Halo","score":100.0,"title_score":100.0}"#);
}
