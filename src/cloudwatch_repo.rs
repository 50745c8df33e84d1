// CloudWatch billing metrics via aws-sdk-cloudwatch

use crate::error::BillingError;
use crate::models::{Datapoint, MetricRequest, Statistic, TimeRange};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::operation::get_metric_statistics::builders::GetMetricStatisticsFluentBuilder;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{
    Datapoint as AwsDatapoint, Dimension, Statistic as AwsStatistic,
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

pub const NAMESPACE: &str = "AWS/Billing";
/// Billing metrics are only published in us-east-1.
pub const DEFAULT_REGION: &str = "us-east-1";
const CURRENCY_DIMENSION: &str = "Currency";
const CURRENCY: &str = "USD";
const CREDENTIALS_PROVIDER_NAME: &str = "mackerel-plugin-aws-billing";

/// Source of raw datapoints for one metric/statistic over a window.
pub trait MetricSource {
    fn fetch(
        &self,
        request: &MetricRequest,
        window: &TimeRange,
    ) -> impl Future<Output = Result<Vec<Datapoint>, BillingError>> + Send;
}

impl<T: MetricSource + Send + Sync> MetricSource for Arc<T> {
    fn fetch(
        &self,
        request: &MetricRequest,
        window: &TimeRange,
    ) -> impl Future<Output = Result<Vec<Datapoint>, BillingError>> + Send {
        (**self).fetch(request, window)
    }
}

/// Everything needed to prepare the shared client handle.
#[derive(Debug, Clone, Default)]
pub struct ClientSettings {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

pub struct CloudWatchRepo {
    client: Client,
}

impl CloudWatchRepo {
    /// Builds the client and resolves credentials once. Any failure here is a setup error.
    pub async fn connect(settings: &ClientSettings) -> Result<Self, BillingError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        match (&settings.access_key_id, &settings.secret_access_key) {
            (Some(id), Some(secret)) => {
                loader = loader.credentials_provider(Credentials::new(
                    id.clone(),
                    secret.clone(),
                    None,
                    None,
                    CREDENTIALS_PROVIDER_NAME,
                ));
            }
            (None, None) => {
                tracing::debug!("no access key given, using the default credentials chain");
            }
            _ => {
                return Err(BillingError::Setup(
                    "access key id and secret access key must be given together".into(),
                ));
            }
        }
        if let Some(url) = &settings.endpoint_url {
            loader = loader.endpoint_url(url.clone());
        }

        let sdk_config = loader.load().await;
        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| BillingError::Setup("no credentials provider configured".into()))?;
        provider.provide_credentials().await.map_err(|e| {
            BillingError::Setup(format!("credentials: {}", DisplayErrorContext(&e)))
        })?;

        tracing::debug!(region = %settings.region, "CloudWatch client prepared");
        Ok(Self {
            client: Client::new(&sdk_config),
        })
    }
}

impl MetricSource for CloudWatchRepo {
    #[instrument(skip(self, window), fields(repo = "cloudwatch", operation = "get_metric_statistics", metric = %request.name))]
    async fn fetch(
        &self,
        request: &MetricRequest,
        window: &TimeRange,
    ) -> Result<Vec<Datapoint>, BillingError> {
        let output = statistics_request(&self.client, request, window)?
            .send()
            .await
            .map_err(|e| BillingError::Query {
                metric: request.name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let datapoints = convert_datapoints(output.datapoints(), request.statistic);
        tracing::debug!(
            returned = output.datapoints().len(),
            usable = datapoints.len(),
            "datapoints fetched"
        );
        Ok(datapoints)
    }
}

/// GetMetricStatistics for one metric: billing namespace, USD currency, one period over the whole window.
fn statistics_request(
    client: &Client,
    request: &MetricRequest,
    window: &TimeRange,
) -> Result<GetMetricStatisticsFluentBuilder, BillingError> {
    let period = i32::try_from(window.period_secs()).map_err(|_| BillingError::Query {
        metric: request.name.clone(),
        message: format!("period out of range: {}", window.period_secs()),
    })?;
    Ok(client
        .get_metric_statistics()
        .namespace(NAMESPACE)
        .metric_name(&request.name)
        .dimensions(
            Dimension::builder()
                .name(CURRENCY_DIMENSION)
                .value(CURRENCY)
                .build(),
        )
        .start_time(to_aws_time(window.start))
        .end_time(to_aws_time(window.end))
        .period(period)
        .statistics(to_aws_statistic(request.statistic)))
}

fn to_aws_statistic(statistic: Statistic) -> AwsStatistic {
    match statistic {
        Statistic::Maximum => AwsStatistic::Maximum,
        Statistic::Minimum => AwsStatistic::Minimum,
        Statistic::Average => AwsStatistic::Average,
        Statistic::Sum => AwsStatistic::Sum,
    }
}

fn to_aws_time(t: DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_millis(t.timestamp_millis())
}

fn from_aws_time(t: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos())
}

/// Keeps provider order; drops datapoints missing a timestamp or the requested statistic.
pub(crate) fn convert_datapoints(raw: &[AwsDatapoint], statistic: Statistic) -> Vec<Datapoint> {
    raw.iter()
        .filter_map(|dp| {
            let timestamp = dp.timestamp().and_then(from_aws_time)?;
            let value = match statistic {
                Statistic::Maximum => dp.maximum(),
                Statistic::Minimum => dp.minimum(),
                Statistic::Average => dp.average(),
                Statistic::Sum => dp.sum(),
            }?;
            Some(Datapoint::new(timestamp, value))
        })
        .collect()
}
