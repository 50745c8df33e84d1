// Metric report assembly: query + select per metric, tolerating per-metric failure.

use crate::cloudwatch_repo::MetricSource;
use crate::error::BillingError;
use crate::models::{GraphDefinitions, MetricReport, MetricRequest, TimeRange};
use crate::selector::select_stable;
use chrono::Utc;
use std::sync::Arc;

/// Receives the diagnostic for every metric dropped from a report.
pub trait DiagnosticSink {
    fn metric_failed(&self, request: &MetricRequest, error: &BillingError);
}

/// Default sink: one WARN event per failed metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn metric_failed(&self, request: &MetricRequest, error: &BillingError) {
        tracing::warn!(
            metric = %request.name,
            statistic = %request.statistic,
            error = %error,
            operation = "build_report",
            "metric dropped from report"
        );
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&MetricRequest, &BillingError),
{
    fn metric_failed(&self, request: &MetricRequest, error: &BillingError) {
        self(request, error)
    }
}

pub struct ReportAssembler<S, D = TracingSink> {
    source: S,
    graphs: Arc<GraphDefinitions>,
    sink: D,
}

impl<S: MetricSource> ReportAssembler<S, TracingSink> {
    pub fn new(source: S, graphs: Arc<GraphDefinitions>) -> Self {
        Self::with_sink(source, graphs, TracingSink)
    }
}

impl<S: MetricSource, D: DiagnosticSink> ReportAssembler<S, D> {
    pub fn with_sink(source: S, graphs: Arc<GraphDefinitions>, sink: D) -> Self {
        Self {
            source,
            graphs,
            sink,
        }
    }

    /// The schema every reported name is checked against.
    pub fn graph_definitions(&self) -> &GraphDefinitions {
        &self.graphs
    }

    /// Queries each request in order. Never fails: a failed metric is reported to the
    /// sink and left out of the report, the remaining requests still run.
    pub async fn build_report(&self, requests: &[MetricRequest]) -> MetricReport {
        let mut report = MetricReport::new();
        for request in requests {
            match self.fetch_one(request).await {
                Ok(value) => {
                    tracing::debug!(metric = %request.name, value, "stable value selected");
                    report.insert(request.name.clone(), value);
                }
                Err(e) => self.sink.metric_failed(request, &e),
            }
        }
        tracing::debug!(
            requested = requests.len(),
            reported = report.len(),
            "report built"
        );
        report
    }

    async fn fetch_one(&self, request: &MetricRequest) -> Result<f64, BillingError> {
        if !self.graphs.declares(&request.name) {
            return Err(BillingError::Undeclared {
                metric: request.name.clone(),
            });
        }
        let now = Utc::now();
        let window = TimeRange::lookback(now);
        let datapoints = self.source.fetch(request, &window).await?;
        select_stable(&request.name, &datapoints, now)
    }
}
