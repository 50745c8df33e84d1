// Host agent protocol: graph definitions (meta mode) and metric value lines

use crate::models::{GraphDefinitions, MetricReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::Write;

/// Set (to any non-empty value) by the agent when it wants the graph definitions instead of values.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";
pub const META_HEADER: &str = "# mackerel-agent-plugin";

pub fn is_meta_mode() -> bool {
    meta_mode_from(std::env::var_os(META_ENV).as_deref())
}

pub fn meta_mode_from(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

#[derive(Serialize)]
struct GraphDefPayload<'a> {
    graphs: BTreeMap<&'a str, GraphPayload<'a>>,
}

#[derive(Serialize)]
struct GraphPayload<'a> {
    label: &'a str,
    unit: &'a str,
    metrics: Vec<MetricPayload<'a>>,
}

#[derive(Serialize)]
struct MetricPayload<'a> {
    name: &'a str,
    label: &'a str,
    stacked: bool,
}

/// Header line plus one line of JSON describing every graph.
pub fn write_definitions<W: Write>(w: &mut W, graphs: &GraphDefinitions) -> anyhow::Result<()> {
    let payload = GraphDefPayload {
        graphs: graphs
            .graphs()
            .iter()
            .map(|g| {
                (
                    g.key.as_str(),
                    GraphPayload {
                        label: &g.label,
                        unit: &g.unit,
                        metrics: g
                            .metrics
                            .iter()
                            .map(|m| MetricPayload {
                                name: &m.name,
                                label: &m.label,
                                stacked: m.stacked,
                            })
                            .collect(),
                    },
                )
            })
            .collect(),
    };
    writeln!(w, "{}", META_HEADER)?;
    writeln!(w, "{}", serde_json::to_string(&payload)?)?;
    Ok(())
}

/// One `<graph>.<metric>\t<value>\t<unix secs>` line per reported metric, in schema order.
/// Names not declared in `graphs` are never written.
pub fn write_values<W: Write>(
    w: &mut W,
    graphs: &GraphDefinitions,
    values: &MetricReport,
    now: i64,
) -> std::io::Result<usize> {
    let mut written = 0;
    for g in graphs.graphs() {
        for m in &g.metrics {
            if let Some(v) = values.get(&m.name) {
                writeln!(w, "{}.{}\t{:.6}\t{}", g.key, m.name, v, now)?;
                written += 1;
            }
        }
    }
    Ok(written)
}
