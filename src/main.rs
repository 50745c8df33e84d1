use anyhow::Result;
use aws_billing_plugin::*;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the agent protocol
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let app_config = cli.apply(config::AppConfig::load(cli.config.as_deref())?)?;
    let graphs = Arc::new(models::GraphDefinitions::aws_billing());
    tracing::debug!(package = version::NAME, version = version::VERSION, "starting");

    if output::is_meta_mode() {
        output::write_definitions(&mut std::io::stdout().lock(), &graphs)?;
        return Ok(());
    }

    let repo = cloudwatch_repo::CloudWatchRepo::connect(&cli.client_settings(&app_config)).await?;
    let assembler = report::ReportAssembler::new(repo, graphs.clone());
    let report = assembler.build_report(&graphs.requests()).await;

    let now = chrono::Utc::now().timestamp();
    let state_path = Path::new(&app_config.plugin.tempfile);
    let previous = state::load(state_path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "load_state", "ignoring unreadable state file");
        None
    });
    let values = state::resolve_values(&graphs, &report, previous.as_ref(), now);
    output::write_values(&mut std::io::stdout().lock(), &graphs, &values, now)?;

    if let Err(e) = state::save(state_path, &state::PluginState::from_report(&report, now)) {
        tracing::warn!(error = %e, operation = "save_state", "failed to save state file");
    }
    Ok(())
}
