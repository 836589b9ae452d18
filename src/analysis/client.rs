use super::{classify_response, AnalysisFetcher, AnalysisOutcome, ApiError};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = concat!("moodscope/", env!("CARGO_PKG_VERSION"));

pub struct HttpAnalysisClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn analyse_url(&self, handle: &str) -> String {
        format!(
            "{}/api/analyse?name={}",
            self.base_url,
            urlencoding::encode(handle)
        )
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.base_url)
    }
}

#[async_trait]
impl AnalysisFetcher for HttpAnalysisClient {
    async fn analyse(&self, handle: &str) -> Result<AnalysisOutcome, ApiError> {
        let url = self.analyse_url(handle);
        tracing::debug!(%url, "requesting analysis");

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let outcome = classify_response(status, &body)?;
        tracing::info!(handle, status, outcome = outcome.kind(), "analysis response");
        Ok(outcome)
    }

    async fn health(&self) -> Result<String, ApiError> {
        let response = self.client.get(self.health_url()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Unhealthy {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
