// Schema and report model tests

mod common;

use aws_billing_plugin::models::*;
use chrono::{Duration, TimeZone, Utc};
use common::metric;

#[test]
fn graph_definitions_are_identical_across_calls() {
    let a = GraphDefinitions::aws_billing();
    let b = GraphDefinitions::aws_billing();
    assert_eq!(a, b);
    assert_eq!(a.graphs(), b.graphs());
}

#[test]
fn billing_schema_declares_estimated_charges() {
    let graphs = GraphDefinitions::aws_billing();
    let (graph, m) = graphs.find_metric("EstimatedCharges").expect("declared");
    assert_eq!(graph.key, "AWS.Billing");
    assert_eq!(graph.label, "AWS Billing");
    assert_eq!(graph.unit, "float");
    assert_eq!(m.statistic, Statistic::Maximum);
    assert_eq!(m.value_type, ValueType::Float64);
    assert!(!m.diff);
    assert_eq!(graphs.metric_names().collect::<Vec<_>>(), vec!["EstimatedCharges"]);
}

#[test]
fn requests_follow_declaration_order() {
    let graphs = common::graphs_with(vec![metric("B", false), metric("A", true)]);
    let requests = graphs.requests();
    let names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["EstimatedCharges", "B", "A"]);
    assert_eq!(requests[0], MetricRequest::new("EstimatedCharges", Statistic::Maximum));
}

#[test]
fn try_new_rejects_duplicate_metric_names() {
    let err = GraphDefinitions::try_new(vec![
        GraphDefinition {
            key: "g1".into(),
            label: "g1".into(),
            unit: "float".into(),
            metrics: vec![metric("X", false)],
        },
        GraphDefinition {
            key: "g2".into(),
            label: "g2".into(),
            unit: "float".into(),
            metrics: vec![metric("X", false)],
        },
    ])
    .unwrap_err();
    assert!(err.to_string().contains("X"));
}

#[test]
fn try_new_rejects_duplicate_or_empty_graph_keys() {
    let graph = |key: &str, name: &str| GraphDefinition {
        key: key.into(),
        label: key.into(),
        unit: "float".into(),
        metrics: vec![metric(name, false)],
    };
    assert!(GraphDefinitions::try_new(vec![graph("g", "a"), graph("g", "b")]).is_err());
    assert!(GraphDefinitions::try_new(vec![graph("", "a")]).is_err());
    assert!(GraphDefinitions::try_new(vec![graph("g", "")]).is_err());
}

#[test]
fn lookback_window_is_six_hours() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let window = TimeRange::lookback(now);
    assert_eq!(window.end, now);
    assert_eq!(window.start, now - Duration::hours(6));
    assert_eq!(window.period_secs(), LOOKBACK_SECS);
}

#[test]
fn metric_report_serializes_as_flat_map() {
    let mut report = MetricReport::new();
    report.insert("EstimatedCharges", 10.0);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json, serde_json::json!({ "EstimatedCharges": 10.0 }));
}

#[test]
fn value_type_serializes_lowercase() {
    let json = serde_json::to_string(&ValueType::Float64).unwrap();
    assert_eq!(json, "\"float64\"");
}

#[test]
fn statistic_display_matches_provider_names() {
    assert_eq!(Statistic::Maximum.to_string(), "Maximum");
    assert_eq!(Statistic::Sum.as_str(), "Sum");
    assert_eq!(
        MetricRequest::new("EstimatedCharges", Statistic::Average).to_string(),
        "EstimatedCharges(Average)"
    );
}
