use crate::cloudwatch_repo::DEFAULT_REGION;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Overrides the CloudWatch endpoint (e.g. a local mock).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    /// State file used for diff metrics between runs.
    #[serde(default = "default_tempfile")]
    pub tempfile: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            tempfile: default_tempfile(),
        }
    }
}

fn default_tempfile() -> String {
    "/tmp/mackerel-plugin-aws-billing".into()
}

impl AppConfig {
    /// Reads `path`, else `CONFIG_FILE`, else falls back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match std::env::var("CONFIG_FILE") {
                Ok(p) => p.into(),
                Err(_) => return Ok(Self::default()),
            },
        };
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.aws.region.is_empty(), "aws.region must be non-empty");
        if let Some(url) = &self.aws.endpoint_url {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "aws.endpoint_url must start with http:// or https://, got {}",
                url
            );
        }
        anyhow::ensure!(
            !self.plugin.tempfile.is_empty(),
            "plugin.tempfile must be non-empty"
        );
        Ok(())
    }
}
