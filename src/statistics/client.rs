use async_trait::async_trait;

use crate::error::AppError;
use crate::models::vote::{HookId, Vote};

/// One outbound "increment counter" call for a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsRequest {
    pub vote: Vote,
    pub hook_id: HookId,
}

impl StatisticsRequest {
    pub fn new(vote: Vote, hook_id: HookId) -> Self {
        Self { vote, hook_id }
    }

    /// Path and query of the request, relative to the site root.
    pub fn path(&self) -> String {
        format!(
            "/api/hook/statistics/{}?hookId={}",
            self.vote.endpoint(),
            self.hook_id
        )
    }

    /// Full URL of the request under `site_url`.
    pub fn url(&self, site_url: &str) -> String {
        format!("{}{}", site_url.trim_end_matches('/'), self.path())
    }
}

/// Trait for the statistics collaborator that counts votes.
///
/// Abstracted as a trait so tests can use a mock without a live site.
/// Futures are not `Send` because the widget drives them on the browser's
/// single-threaded executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait StatisticsService {
    /// Issue the increment call. The response body is ignored.
    async fn increment(&self, request: &StatisticsRequest) -> Result<(), AppError>;
}

/// Statistics endpoint configuration.
#[derive(Debug, Clone)]
pub struct StatisticsConfig {
    /// Base URL of the site hosting the statistics API (e.g. `https://hooks.example.com`).
    pub site_url: String,
}

impl StatisticsConfig {
    /// Read the configuration from the `SITE_URL` environment variable.
    pub fn from_env() -> Result<Self, AppError> {
        let site_url = std::env::var("SITE_URL")
            .map_err(|_| AppError::Config("SITE_URL not set".into()))?;
        Ok(Self::new(site_url))
    }

    /// Build with an explicit value (useful for testing / DI).
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }
}

/// HTTP implementation of [`StatisticsService`] issuing plain GET requests.
#[derive(Debug, Clone)]
pub struct HttpStatisticsService {
    client: reqwest::Client,
    site_url: String,
}

impl HttpStatisticsService {
    pub fn new(config: StatisticsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            site_url: config.site_url,
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }
}

#[async_trait(?Send)]
impl StatisticsService for HttpStatisticsService {
    async fn increment(&self, request: &StatisticsRequest) -> Result<(), AppError> {
        let url = request.url(&self.site_url);
        self.client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::Network(format!("GET {url} failed: {e}")))?;
        Ok(())
    }
}

/// Fire one request and forget about it.
///
/// Failures are logged and dropped: the widget has already committed its
/// local state and never retries.
pub async fn dispatch(service: &dyn StatisticsService, request: &StatisticsRequest) {
    match service.increment(request).await {
        Ok(()) => tracing::trace!(
            "Recorded {} vote for hook {}",
            request.vote,
            request.hook_id
        ),
        Err(e) => tracing::debug!(
            "Dropping failed {} vote for hook {}: {e}",
            request.vote,
            request.hook_id
        ),
    }
}
