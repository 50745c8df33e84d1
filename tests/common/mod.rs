// Shared test helpers

#![allow(dead_code)]

use aws_billing_plugin::cloudwatch_repo::MetricSource;
use aws_billing_plugin::error::BillingError;
use aws_billing_plugin::models::*;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned per-metric responses; datapoints are (hours before the window end, value).
#[derive(Default)]
pub struct FakeSource {
    responses: HashMap<String, Result<Vec<(i64, f64)>, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(mut self, metric: &str, points: &[(i64, f64)]) -> Self {
        self.responses
            .insert(metric.to_string(), Ok(points.to_vec()));
        self
    }

    pub fn with_error(mut self, metric: &str, message: &str) -> Self {
        self.responses
            .insert(metric.to_string(), Err(message.to_string()));
        self
    }

    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl MetricSource for FakeSource {
    async fn fetch(
        &self,
        request: &MetricRequest,
        window: &TimeRange,
    ) -> Result<Vec<Datapoint>, BillingError> {
        self.calls.lock().unwrap().push(request.name.clone());
        match self.responses.get(&request.name) {
            Some(Ok(points)) => Ok(points
                .iter()
                .map(|(hours, v)| Datapoint::new(window.end - Duration::hours(*hours), *v))
                .collect()),
            Some(Err(message)) => Err(BillingError::Query {
                metric: request.name.clone(),
                message: message.clone(),
            }),
            None => Ok(vec![]),
        }
    }
}

pub fn metric(name: &str, diff: bool) -> MetricDefinition {
    MetricDefinition {
        name: name.into(),
        label: name.into(),
        value_type: ValueType::Float64,
        statistic: Statistic::Maximum,
        diff,
        stacked: false,
    }
}

/// Billing graph plus a second graph with the given extra metrics.
pub fn graphs_with(extra: Vec<MetricDefinition>) -> GraphDefinitions {
    let mut graphs = GraphDefinitions::aws_billing().graphs().to_vec();
    graphs.push(GraphDefinition {
        key: "AWS.Extra".into(),
        label: "AWS Extra".into(),
        unit: "float".into(),
        metrics: extra,
    });
    GraphDefinitions::try_new(graphs).expect("valid graphs")
}

