//! Bounded calls to the validator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::types::{UpstreamError, ValidateRequest, ValidationResponse};

/// Transport to a validator service.
#[async_trait]
pub trait AddressValidator: Send + Sync {
    /// Validate one address. `wait` asks the validator to stall that many
    /// seconds before answering.
    async fn validate(
        &self,
        address: &str,
        wait: Option<u64>,
    ) -> Result<ValidationResponse, UpstreamError>;
}

/// Validator reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpValidator {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let endpoint = Url::parse(&config.base_url)?.join("validate")?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .pool_max_idle_per_host(config.pool_max_idle)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url_for(&self, wait: Option<u64>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(wait) = wait {
            url.query_pairs_mut().append_pair("wait", &wait.to_string());
        }
        url
    }
}

#[async_trait]
impl AddressValidator for HttpValidator {
    async fn validate(
        &self,
        address: &str,
        wait: Option<u64>,
    ) -> Result<ValidationResponse, UpstreamError> {
        let url = self.url_for(wait);
        tracing::debug!(url = %url, address = %address, "Sending validation request");

        let response = self
            .client
            .post(url)
            .json(&ValidateRequest { address })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "Validator returned non-200 status");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.json::<ValidationResponse>().await?)
    }
}

/// What came back from one bounded upstream call.
#[derive(Debug)]
pub enum DependencyResult {
    Success(ValidationResponse),
    /// Bound elapsed; the call was dropped.
    Timeout,
    /// Any non-timeout failure. Never retried.
    Failed(UpstreamError),
}

/// Issues validator calls under a fixed bound.
#[derive(Clone)]
pub struct DependencyClient {
    validator: Arc<dyn AddressValidator>,
    bound: Duration,
}

impl DependencyClient {
    pub fn new(validator: Arc<dyn AddressValidator>, bound: Duration) -> Self {
        Self { validator, bound }
    }

    pub fn bound(&self) -> Duration {
        self.bound
    }

    pub async fn call(&self, address: &str, wait: Option<u64>) -> DependencyResult {
        let started = Instant::now();
        let call = self.validator.validate(address, wait);
        let attempt = tokio::time::timeout(self.bound, call).await;
        let result = match attempt {
            Ok(Ok(response)) => DependencyResult::Success(response),
            Ok(Err(UpstreamError::Timeout)) | Err(_) => DependencyResult::Timeout,
            Ok(Err(e)) => DependencyResult::Failed(e),
        };

        let label = match &result {
            DependencyResult::Success(_) => "success",
            DependencyResult::Timeout => "timeout",
            DependencyResult::Failed(e) => e.kind(),
        };
        metrics::record_upstream_call(label, started);

        match &result {
            DependencyResult::Success(resp) => {
                tracing::info!(address = %address, message = %resp.message, "Validator response");
            }
            DependencyResult::Timeout => {
                tracing::error!(
                    address = %address,
                    bound_ms = self.bound.as_millis() as u64,
                    "Validator call timed out"
                );
            }
            DependencyResult::Failed(e) => {
                tracing::error!(
                    address = %address,
                    error = %e,
                    "Failed to validate address with external service"
                );
            }
        }

        result
    }
}
