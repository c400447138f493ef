use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::odds_api::client::DEFAULT_HOST;
use crate::odds_api::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub odds_api_key: String,
    pub odds_api_host: String,

    pub sport_key: String,
    pub regions: String,
    pub markets: String,

    pub funds: String,
    pub max_bets: usize,

    // Fetch
    pub fetch_max_attempts: u32,
    pub fetch_backoff_ms: u64,
    pub http_timeout_sec: u64,

    // Output
    pub recommendations_jsonl_path: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let c = config::Config::builder()
            .set_default("odds_api_host", DEFAULT_HOST)?
            .set_default("sport_key", "soccer_epl")?
            .set_default("regions", "us")?
            .set_default("markets", "h2h")?
            .set_default("funds", "100")?
            .set_default("max_bets", 5i64)?
            .set_default("fetch_max_attempts", 3i64)?
            .set_default("fetch_backoff_ms", 500i64)?
            .set_default("http_timeout_sec", 10i64)?
            .add_source(config::Environment::default())
            .build()?;
        let s: Settings = c.try_deserialize().context("load settings from environment (is ODDS_API_KEY set?)")?;
        s.validate()?;
        Ok(s)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.odds_api_key.trim().is_empty() {
            anyhow::bail!("ODDS_API_KEY is empty");
        }
        let funds = self.funds()?;
        if funds <= Decimal::ZERO {
            anyhow::bail!("FUNDS must be positive, got {}", self.funds);
        }
        if funds.round_dp(2) != funds {
            anyhow::bail!("FUNDS must be whole cents, got {}", self.funds);
        }
        if self.max_bets == 0 {
            anyhow::bail!("MAX_BETS must be at least 1");
        }
        Ok(())
    }

    pub fn funds(&self) -> anyhow::Result<Decimal> {
        self.funds
            .trim()
            .parse::<Decimal>()
            .with_context(|| format!("FUNDS is not a decimal: {}", self.funds))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.fetch_max_attempts,
            base_delay: Duration::from_millis(self.fetch_backoff_ms),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }
}
