// Command-line flags

use crate::cloudwatch_repo::ClientSettings;
use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Reports AWS estimated charges to mackerel-agent.
#[derive(Parser, Debug, Default)]
#[command(name = "mackerel-plugin-aws-billing", version, about)]
pub struct Cli {
    /// AWS Access Key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// AWS Secret Access Key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Temp file name
    #[arg(long)]
    pub tempfile: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.is_empty()).cloned()
}

impl Cli {
    /// Flags win over the config file. Empty flags count as unset.
    pub fn apply(&self, mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Some(t) = non_empty(&self.tempfile) {
            config.plugin.tempfile = t;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn client_settings(&self, config: &AppConfig) -> ClientSettings {
        ClientSettings {
            region: config.aws.region.clone(),
            endpoint_url: config.aws.endpoint_url.clone(),
            access_key_id: non_empty(&self.access_key_id),
            secret_access_key: non_empty(&self.secret_access_key),
        }
    }
}
