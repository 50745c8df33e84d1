// Error taxonomy for setup and per-metric retrieval

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    /// Credentials or client construction failed. Fatal for the run.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The provider call for one metric failed.
    #[error("query for {metric} failed: {message}")]
    Query { metric: String, message: String },

    /// The provider returned no datapoint usable as a stable value.
    #[error("fetched no datapoints for {metric}")]
    NoData { metric: String },

    /// The request names a metric that no graph definition declares.
    #[error("metric {metric} is not declared in any graph definition")]
    Undeclared { metric: String },
}

