pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed response: missing field {0}")]
    MissingField(&'static str),
    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),
    #[error("health check returned {status}: {body}")]
    Unhealthy { status: u16, body: String },
}

/// Identifier of an analysed user. The server emits an integer, some
/// deployments send it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl UserId {
    /// Zero and the empty string do not count as an identifier.
    fn is_present(&self) -> bool {
        match self {
            UserId::Number(n) => *n != 0,
            UserId::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub user_id: UserId,
    pub positive_tweets: u64,
    pub negative_tweets: u64,
    /// Mean sentiment score, roughly in [-1, 1].
    pub average_score: f64,
}

impl AnalysisResult {
    pub fn total_tweets(&self) -> u64 {
        self.positive_tweets.saturating_add(self.negative_tweets)
    }

    /// Average score scaled to a percentage for display.
    pub fn average_percent(&self) -> f64 {
        self.average_score * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success(AnalysisResult),
    /// A 2xx response that carried a message instead of a user.
    LogicalFailure { message: String },
    /// A non-2xx response, body kept verbatim.
    TransportFailure { status: u16, body: String },
}

impl AnalysisOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisOutcome::Success(_) => "success",
            AnalysisOutcome::LogicalFailure { .. } => "logical_failure",
            AnalysisOutcome::TransportFailure { .. } => "transport_failure",
        }
    }

    /// Text shown to the user for the failure variants.
    pub fn alert_text(&self) -> Option<String> {
        match self {
            AnalysisOutcome::Success(_) => None,
            AnalysisOutcome::LogicalFailure { message } => Some(message.clone()),
            AnalysisOutcome::TransportFailure { status, body } => {
                Some(format!("BAD RESPONSE: {}: {}", status, body))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyseResponse {
    #[serde(rename = "UserID")]
    user_id: Option<UserId>,
    #[serde(rename = "PositiveTweets")]
    positive_tweets: Option<u64>,
    #[serde(rename = "NegativeTweets")]
    negative_tweets: Option<u64>,
    #[serde(rename = "AverageScore")]
    average_score: Option<f64>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

/// Classifies a raw `/api/analyse` response.
pub fn classify_response(status: u16, body: &str) -> Result<AnalysisOutcome, ApiError> {
    if !(200..300).contains(&status) {
        return Ok(AnalysisOutcome::TransportFailure {
            status,
            body: body.to_string(),
        });
    }

    let raw: AnalyseResponse = serde_json::from_str(body)?;

    match raw.user_id {
        Some(user_id) if user_id.is_present() => Ok(AnalysisOutcome::Success(AnalysisResult {
            user_id,
            positive_tweets: raw
                .positive_tweets
                .ok_or(ApiError::MissingField("PositiveTweets"))?,
            negative_tweets: raw
                .negative_tweets
                .ok_or(ApiError::MissingField("NegativeTweets"))?,
            average_score: raw
                .average_score
                .ok_or(ApiError::MissingField("AverageScore"))?,
        })),
        _ => Ok(AnalysisOutcome::LogicalFailure {
            message: raw.message.unwrap_or_default(),
        }),
    }
}

#[async_trait]
pub trait AnalysisFetcher: Send + Sync {
    async fn analyse(&self, handle: &str) -> Result<AnalysisOutcome, ApiError>;

    /// Returns the health endpoint's body on success.
    async fn health(&self) -> Result<String, ApiError>;
}
