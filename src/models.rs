// Domain models: metric requests, datapoints, reports and the graph schema

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Lookback window and sampling period requested from the provider (6 hours).
pub const LOOKBACK_SECS: i64 = 21_600;

/// Aggregation requested from the provider for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Maximum,
    Minimum,
    Average,
    Sum,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Maximum => "Maximum",
            Statistic::Minimum => "Minimum",
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metric/statistic pair to query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricRequest {
    pub name: String,
    pub statistic: Statistic,
}

impl MetricRequest {
    pub fn new(name: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            name: name.into(),
            statistic,
        }
    }
}

impl fmt::Display for MetricRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.statistic)
    }
}

/// One provider sample for the requested statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Datapoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Query window; the period requested equals the window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The fixed window ending at `now`.
    pub fn lookback(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::seconds(LOOKBACK_SECS),
            end: now,
        }
    }

    pub fn period_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// Per-run result: metric name -> selected stable value. Absent names failed this run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricReport {
    values: BTreeMap<String, f64>,
}

impl MetricReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Value type advertised for a metric; serializes to "float64" / "uint64".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Float64,
    Uint64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub name: String,
    pub label: String,
    pub value_type: ValueType,
    /// Statistic queried from the provider for this series.
    pub statistic: Statistic,
    /// Report the per-minute delta against the previous run instead of the raw value.
    pub diff: bool,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphDefinition {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub metrics: Vec<MetricDefinition>,
}

/// The process-wide schema: constructed once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDefinitions {
    graphs: Vec<GraphDefinition>,
}

impl GraphDefinitions {
    /// Build from a list of graphs. Graph keys and metric names must be non-empty and unique.
    pub fn try_new(graphs: Vec<GraphDefinition>) -> anyhow::Result<Self> {
        let mut keys = HashSet::new();
        let mut names = HashSet::new();
        for g in &graphs {
            anyhow::ensure!(!g.key.is_empty(), "graph key must be non-empty");
            anyhow::ensure!(keys.insert(g.key.as_str()), "duplicate graph key {}", g.key);
            for m in &g.metrics {
                anyhow::ensure!(
                    !m.name.is_empty(),
                    "metric name in graph {} must be non-empty",
                    g.key
                );
                anyhow::ensure!(
                    names.insert(m.name.as_str()),
                    "metric {} declared more than once",
                    m.name
                );
            }
        }
        Ok(Self { graphs })
    }

    /// The AWS billing graph: estimated charges in USD, Maximum statistic.
    pub fn aws_billing() -> Self {
        Self {
            graphs: vec![GraphDefinition {
                key: "AWS.Billing".into(),
                label: "AWS Billing".into(),
                unit: "float".into(),
                metrics: vec![MetricDefinition {
                    name: "EstimatedCharges".into(),
                    label: "EstimatedCharges".into(),
                    value_type: ValueType::Float64,
                    statistic: Statistic::Maximum,
                    diff: false,
                    stacked: false,
                }],
            }],
        }
    }

    pub fn graphs(&self) -> &[GraphDefinition] {
        &self.graphs
    }

    pub fn find_metric(&self, name: &str) -> Option<(&GraphDefinition, &MetricDefinition)> {
        self.graphs
            .iter()
            .find_map(|g| g.metrics.iter().find(|m| m.name == name).map(|m| (g, m)))
    }

    pub fn declares(&self, name: &str) -> bool {
        self.find_metric(name).is_some()
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.graphs
            .iter()
            .flat_map(|g| g.metrics.iter().map(|m| m.name.as_str()))
    }

    /// One request per declared series, in declaration order.
    pub fn requests(&self) -> Vec<MetricRequest> {
        self.graphs
            .iter()
            .flat_map(|g| g.metrics.iter())
            .map(|m| MetricRequest::new(m.name.clone(), m.statistic))
            .collect()
    }
}
