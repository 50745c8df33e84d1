// Stable datapoint selection.
// The newest datapoint in a response may still be revised by the provider; the oldest one
// inside the lookback window is considered settled, so that is the one we report.

use crate::error::BillingError;
use crate::models::Datapoint;
use chrono::{DateTime, Utc};

/// Returns the value of the datapoint with the earliest timestamp strictly before `now`.
///
/// Ties on the earliest timestamp keep the first datapoint in response order.
/// Fails with `NoData` when `datapoints` is empty or no timestamp is earlier than `now`.
pub fn select_stable(
    metric: &str,
    datapoints: &[Datapoint],
    now: DateTime<Utc>,
) -> Result<f64, BillingError> {
    let mut least = now;
    let mut selected: Option<f64> = None;
    for dp in datapoints {
        // strict: an equal timestamp never replaces the earlier pick
        if dp.timestamp < least {
            least = dp.timestamp;
            selected = Some(dp.value);
        }
    }
    selected.ok_or_else(|| BillingError::NoData {
        metric: metric.to_string(),
    })
}
