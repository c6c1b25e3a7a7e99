//! Asynchronous client for the bracket generation API.
//!
//! [`BracketClient::request_bracket`] is what a selection UI calls: it never
//! fails outright, it folds every problem into a [`ClientResult`] the UI can
//! render directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bracket_proto::{
    GenerateBracketRequest, GenerateBracketResponse, Team, TeamId, GENERATE_BRACKET_PATH,
    TEAMS_PATH,
};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3002";

/// Reported when the server could not be reached at all.
pub const CONNECT_FAILURE: &str = "Failed to connect to bracket generation service";
const STATUS_FAILURE: &str = "Failed to generate bracket";
const BODY_FAILURE: &str = "Unknown error generating bracket";

/// What the selection UI gets back from one generation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClientResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug)]
pub struct BracketClient {
    http: Client,
    base_url: Url,
    cache_buster: CacheBuster,
}

impl BracketClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self::with_http(Client::new(), Url::parse(base_url)?))
    }

    pub fn with_http(http: Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cache_buster: CacheBuster::default(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Asks the server for a bracket highlighting `team_ids`. Suspends until
    /// the server answers; there is no timeout or retry at this layer.
    pub async fn request_bracket(&self, team_ids: &[TeamId]) -> ClientResult {
        match self.send_generate(team_ids).await {
            Ok((status, body)) => self.interpret(status, body),
            Err(err) => {
                warn!(error = %err, "bracket generation request failed");
                ClientResult::failed(transport_failure_message(&err))
            }
        }
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, ClientError> {
        let res = self.http.get(self.base_url.join(TEAMS_PATH)?).send().await?;
        if res.status().is_success() {
            Ok(res.json::<Vec<Team>>().await?)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status, body })
        }
    }

    async fn send_generate(
        &self,
        team_ids: &[TeamId],
    ) -> Result<(reqwest::StatusCode, GenerateBracketResponse), ClientError> {
        let url = self.base_url.join(GENERATE_BRACKET_PATH)?;
        debug!(url = %url, team_ids = ?team_ids, "requesting bracket");
        let res = self
            .http
            .post(url)
            .json(&GenerateBracketRequest::from_ids(team_ids))
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<GenerateBracketResponse>().await?;
        Ok((status, body))
    }

    fn interpret(&self, status: reqwest::StatusCode, body: GenerateBracketResponse) -> ClientResult {
        if !status.is_success() {
            warn!(status = %status, error = ?body.error, "bracket server returned an error");
            return ClientResult::failed(body.error.unwrap_or_else(|| STATUS_FAILURE.into()));
        }
        if !body.success {
            return ClientResult::failed(body.error.unwrap_or_else(|| BODY_FAILURE.into()));
        }
        let Some(path) = body.bracket_url else {
            return ClientResult::failed(BODY_FAILURE);
        };
        match self.fresh_artifact_url(&path) {
            Ok(url) => ClientResult {
                success: true,
                bracket_url: Some(url.into()),
                champion: body.champion,
                message: body.message,
                error: None,
            },
            Err(err) => ClientResult::failed(err.to_string()),
        }
    }

    /// Absolute artifact URL with a `t` parameter no earlier call returned.
    fn fresh_artifact_url(&self, path: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .append_pair("t", &self.cache_buster.next().to_string());
        Ok(url)
    }
}

/// Unreachable servers get the generic connectivity message; anything that
/// got as far as a response keeps its own detail.
fn transport_failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Http(err) if err.is_connect() || err.is_timeout() => {
            CONNECT_FAILURE.to_string()
        }
        other => other.to_string(),
    }
}

/// Millisecond timestamps, bumped when two calls land in the same
/// millisecond so every value is strictly greater than the last.
#[derive(Debug, Default)]
struct CacheBuster {
    last: AtomicU64,
}

impl CacheBuster {
    fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut next = now;
        // fetch_update only fails when the closure returns None.
        let _ = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                next = now.max(last + 1);
                Some(next)
            });
        next
    }
}
