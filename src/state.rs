// Previous-run state file and per-minute deltas for diff metrics

use crate::models::{GraphDefinitions, MetricReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Deltas against state older than this are not reported.
pub const MAX_DIFF_SECS: i64 = 600;

/// Raw values of the last run and when they were taken (unix seconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginState {
    pub timestamp: i64,
    pub values: BTreeMap<String, f64>,
}

impl PluginState {
    pub fn from_report(report: &MetricReport, timestamp: i64) -> Self {
        Self {
            timestamp,
            values: report.iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// Reads the state file. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> anyhow::Result<Option<PluginState>> {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(anyhow::anyhow!("read {}: {}", path.display(), e)),
    };
    let state = serde_json::from_str(&s)
        .map_err(|e| anyhow::anyhow!("parse {}: {}", path.display(), e))?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &PluginState) -> anyhow::Result<()> {
    let json = serde_json::to_string(state)?;
    std::fs::write(path, json).map_err(|e| anyhow::anyhow!("write {}: {}", path.display(), e))?;
    Ok(())
}

/// Per-minute increase of `current` since `last`, or `None` when it cannot be trusted:
/// no elapsed time, a timestamp too far off to subtract, state older than `MAX_DIFF_SECS`,
/// or the counter went backwards.
pub fn per_minute_delta(current: f64, now: i64, last: f64, last_time: i64) -> Option<f64> {
    let elapsed = now.checked_sub(last_time)?;
    if elapsed <= 0 || elapsed > MAX_DIFF_SECS {
        return None;
    }
    if current < last {
        return None;
    }
    Some((current - last) * 60.0 / elapsed as f64)
}

/// Values to emit this run: raw for plain metrics, per-minute delta for diff metrics.
/// Diff metrics without a usable previous value are left out.
pub fn resolve_values(
    graphs: &GraphDefinitions,
    report: &MetricReport,
    previous: Option<&PluginState>,
    now: i64,
) -> MetricReport {
    let mut out = MetricReport::new();
    for (name, value) in report.iter() {
        let Some((_, def)) = graphs.find_metric(name) else {
            continue;
        };
        if !def.diff {
            out.insert(name, value);
            continue;
        }
        let delta = previous.and_then(|p| {
            p.values
                .get(name)
                .and_then(|last| per_minute_delta(value, now, *last, p.timestamp))
        });
        match delta {
            Some(d) => out.insert(name, d),
            None => tracing::debug!(metric = name, "no usable previous value; delta skipped"),
        }
    }
    out
}
