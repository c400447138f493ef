use thiserror::Error;

use crate::error::DataError;
use crate::normalize::{prepare_fixtures, prepare_odds};
use crate::source::EventSource;
use crate::stats::Stats;
use crate::strategy::Strategy;
use crate::types::{Fixture, OddsRecord, Recommendation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Welcome,
    BettingCalculator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GetStarted,
    Back,
}

impl Page {
    pub fn on(self, action: Action) -> Page {
        match (self, action) {
            (Page::Welcome, Action::GetStarted) => Page::BettingCalculator,
            (Page::BettingCalculator, Action::Back) => Page::Welcome,
            (page, _) => page,
        }
    }
}

pub fn render(page: Page) -> &'static str {
    match page {
        Page::Welcome => "Welcome to Beat The House! Data-driven stake recommendations for upcoming fixtures.",
        Page::BettingCalculator => "Betting Calculator",
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CalculatorError {
    #[error("no upcoming events found for the selected league")]
    NoEvents,

    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug)]
pub struct CalculatorRun {
    pub fixtures: Vec<Fixture>,
    pub odds: Vec<OddsRecord>,
    pub recommendation: Recommendation,
}

/// Fetch, normalize and recommend for one league.
///
/// Upstream failures are logged and reported as [`CalculatorError::NoEvents`]
/// so the session never dies on a flaky provider.
pub async fn run_calculator(
    source: &dyn EventSource,
    strategy: &dyn Strategy,
    stats: &Stats,
    sport_key: &str,
) -> Result<CalculatorRun, CalculatorError> {
    stats.inc_fetch();
    let events = match source.fetch_upcoming_events(sport_key).await {
        Ok(events) => events,
        Err(e) => {
            stats.inc_fetch_failure();
            tracing::error!(sport_key, error = %e, "odds fetch failed; treating as no events");
            vec![]
        }
    };
    stats.set_events_loaded(events.len() as u64);

    if events.is_empty() {
        return Err(CalculatorError::NoEvents);
    }

    let fixtures = prepare_fixtures(&events)?;
    let odds = prepare_odds(&events)?;
    stats.set_odds_records(odds.len() as u64);
    tracing::info!(sport_key, fixtures = fixtures.len(), odds = odds.len(), "events normalized");

    let recommendation = strategy.recommend(&odds)?;
    Ok(CalculatorRun { fixtures, odds, recommendation })
}
