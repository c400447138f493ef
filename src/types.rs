use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub date: NaiveDate,
}

/// One bookmaker's head-to-head quote for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub bookmaker: String,
    pub last_update: Option<DateTime<Utc>>,
    pub home_win: Option<Decimal>,
    pub draw: Option<Decimal>,
    pub away_win: Option<Decimal>,
}

impl OddsRecord {
    pub fn event_key(&self) -> EventKey {
        EventKey {
            date: self.date,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }

    pub fn price(&self, market: MarketKind) -> Option<Decimal> {
        match market {
            MarketKind::HomeWin => self.home_win,
            MarketKind::Draw => self.draw,
            MarketKind::AwayWin => self.away_win,
            MarketKind::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    HomeWin,
    Draw,
    AwayWin,
    Unknown,
}

impl MarketKind {
    /// Column order of the odds table when flattened.
    pub const ODDS_COLUMNS: [MarketKind; 3] = [MarketKind::HomeWin, MarketKind::Draw, MarketKind::AwayWin];

    pub fn describe(&self, event: &EventKey) -> String {
        match self {
            MarketKind::HomeWin => format!("bet on {} to win", event.home_team),
            MarketKind::AwayWin => format!("bet on {} to win", event.away_team),
            MarketKind::Draw => "bet on a draw".to_string(),
            MarketKind::Unknown => "unknown bet".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecommendation {
    #[serde(flatten)]
    pub event: EventKey,
    pub market: MarketKind,
    pub odds: Decimal,
    pub bookmaker: String,
    pub bet: String,
    pub stake: Option<Decimal>,
}

/// Outcome of one recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Enough distinct events were found; stakes sum to the funds budget.
    Allocated(Vec<BetRecommendation>),
    /// Fewer distinct events than requested; stakes are left unset.
    Insufficient(Vec<BetRecommendation>),
    /// Nothing usable to allocate against.
    Empty,
}

impl Recommendation {
    pub fn bets(&self) -> &[BetRecommendation] {
        match self {
            Recommendation::Allocated(b) | Recommendation::Insufficient(b) => b,
            Recommendation::Empty => &[],
        }
    }
}
