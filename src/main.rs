mod app;
mod config;
mod error;
mod normalize;
mod odds_api;
mod source;
mod stats;
mod strategy;
mod types;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::app::{render, run_calculator, Action, CalculatorError, Page};
use crate::config::Settings;
use crate::odds_api::OddsApiClient;
use crate::source::OddsApiSource;
use crate::stats::Stats;
use crate::strategy::proportional::ProportionalStakeStrategy;
use crate::types::Recommendation;

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

async fn maybe_write_jsonl(path: &Option<String>, lines: &[String]) {
    if let Some(p) = path.as_ref().map(|x| x.trim().to_string()).filter(|x| !x.is_empty()) {
        match tokio::fs::OpenOptions::new().create(true).append(true).open(&p).await {
            Ok(mut f) => {
                use tokio::io::AsyncWriteExt;
                for line in lines {
                    if let Err(e) = f.write_all(format!("{}\n", line).as_bytes()).await {
                        tracing::warn!(path = %p, error = %e, "failed to append recommendation");
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(path = %p, error = %e, "failed to open recommendations file"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let s = Settings::from_env()?;
    let stats = Stats::new(now_ms());

    let client = OddsApiClient::new(
        s.odds_api_host.clone(),
        s.odds_api_key.clone(),
        s.regions.clone(),
        s.markets.clone(),
        s.retry_policy(),
        s.http_timeout(),
    )
    .context("build odds api client")?;
    let source = OddsApiSource::new(client);

    let strat = ProportionalStakeStrategy {
        funds: s.funds()?,
        max_bets: s.max_bets,
        stats: stats.clone(),
    };

    let mut page = Page::Welcome;
    tracing::info!("{}", render(page));
    page = page.on(Action::GetStarted);
    tracing::info!("{}", render(page));

    let request_id = Uuid::new_v4();
    tracing::info!(
        request_id = %request_id,
        sport_key = %s.sport_key,
        funds = %strat.funds,
        max_bets = strat.max_bets,
        "requesting recommendations"
    );

    let rec = match run_calculator(&source, &strat, &stats, &s.sport_key).await {
        Ok(run) => {
            tracing::debug!(request_id = %request_id, fixtures = run.fixtures.len(), odds = run.odds.len(), "calculator run complete");
            run.recommendation
        }
        Err(CalculatorError::NoEvents) => {
            tracing::warn!(request_id = %request_id, "no upcoming events found for the selected league");
            Recommendation::Empty
        }
        Err(CalculatorError::Data(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "odds data unusable");
            return Err(e).context("compute recommendations");
        }
    };

    match &rec {
        Recommendation::Allocated(_) => {}
        Recommendation::Insufficient(bets) => tracing::warn!(
            request_id = %request_id,
            available = bets.len(),
            requested = strat.max_bets,
            "insufficient distinct events; stakes not allocated"
        ),
        Recommendation::Empty => tracing::info!(request_id = %request_id, "no recommendations"),
    }

    let lines: Vec<String> = rec
        .bets()
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<_, _>>()
        .context("encode recommendations")?;
    for line in &lines {
        println!("{}", line);
    }
    maybe_write_jsonl(&s.recommendations_jsonl_path, &lines).await;

    let ss = stats.snapshot(now_ms());
    tracing::info!(
        elapsed_ms = ss.elapsed_ms,
        fetches = ss.fetches,
        fetch_failures = ss.fetch_failures,
        events_loaded = ss.events_loaded,
        odds_records = ss.odds_records,
        recommendations = ss.recommendations,
        degraded_results = ss.degraded_results,
        "stats"
    );

    page = page.on(Action::Back);
    tracing::debug!(page = ?page, "session finished");
    Ok(())
}
