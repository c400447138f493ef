use async_trait::async_trait;

use crate::error::FetchError;
use crate::odds_api::types::OddsEvent;
use crate::odds_api::OddsApiClient;
use crate::source::EventSource;

/// Wrapper for The Odds API client implementing EventSource
pub struct OddsApiSource {
    inner: OddsApiClient,
}

impl OddsApiSource {
    pub fn new(inner: OddsApiClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EventSource for OddsApiSource {
    async fn fetch_upcoming_events(&self, sport_key: &str) -> Result<Vec<OddsEvent>, FetchError> {
        self.inner.fetch_upcoming_events(sport_key).await
    }
}
