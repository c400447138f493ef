use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::error::FetchError;
use super::types::OddsEvent;

pub const DEFAULT_HOST: &str = "https://api.the-odds-api.com";

const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, doubling from `base_delay` and capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent.
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempt >= attempts => {
                return Err(FetchError::Exhausted { attempts, last: Box::new(e) });
            }
            Err(e) => {
                let delay = policy.backoff(attempt);
                tracing::warn!(attempt, max_attempts = attempts, delay_ms = delay.as_millis() as u64, error = %e, "odds fetch failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[derive(Clone)]
pub struct OddsApiClient {
    host: String,
    api_key: String,
    regions: String,
    markets: String,
    retry: RetryPolicy,
    http: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(
        host: String,
        api_key: String,
        regions: String,
        markets: String,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let api_key = api_key.trim().to_string();
        tracing::debug!(api_key_len = api_key.len(), host = %host, "OddsApiClient initialized");
        Ok(Self { host, api_key, regions, markets, retry, http })
    }

    fn odds_url(&self, sport_key: &str) -> String {
        format!("{}/v4/sports/{}/odds/", self.host.trim_end_matches('/'), sport_key)
    }

    /// Upcoming events with bookmaker quotes for one sport/league key.
    pub async fn fetch_upcoming_events(&self, sport_key: &str) -> Result<Vec<OddsEvent>, FetchError> {
        with_retries(&self.retry, |attempt| async move {
            tracing::debug!(sport_key, attempt, "fetching odds");
            self.fetch_once(sport_key).await
        })
        .await
    }

    async fn fetch_once(&self, sport_key: &str) -> Result<Vec<OddsEvent>, FetchError> {
        let resp = self
            .http
            .get(self.odds_url(sport_key))
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.regions.as_str()),
                ("markets", self.markets.as_str()),
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let remaining = header_str(resp.headers(), "x-requests-remaining");
        let used = header_str(resp.headers(), "x-requests-used");
        tracing::debug!(status = %status, remaining = %remaining, used = %used, "odds api quota");

        let body = resp.text().await?;
        if !status.is_success() {
            let snippet: String = body.chars().take(512).collect();
            return Err(FetchError::Status { status: status.as_u16(), body: snippet });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}
