pub mod odds_api;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::odds_api::types::OddsEvent;

/// Abstraction over wherever upcoming events and their quotes come from.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch upcoming events with bookmaker quotes for a sport/league key.
    async fn fetch_upcoming_events(&self, sport_key: &str) -> Result<Vec<OddsEvent>, FetchError>;
}

pub use odds_api::OddsApiSource;
