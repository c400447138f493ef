use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Stats {
    start_ms: AtomicU64,

    fetches: AtomicU64,
    fetch_failures: AtomicU64,
    events_loaded: AtomicU64,
    odds_records: AtomicU64,

    recommendations: AtomicU64,
    degraded_results: AtomicU64,
}

impl Stats {
    pub fn new(now_ms: u64) -> Arc<Self> {
        let s = Arc::new(Self::default());
        s.start_ms.store(now_ms, Ordering::Relaxed);
        s
    }

    pub fn inc_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_events_loaded(&self, n: u64) {
        self.events_loaded.store(n, Ordering::Relaxed);
    }

    pub fn set_odds_records(&self, n: u64) {
        self.odds_records.store(n, Ordering::Relaxed);
    }

    pub fn add_recommendations(&self, n: u64) {
        self.recommendations.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_degraded(&self) {
        self.degraded_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, now_ms: u64) -> StatsSnapshot {
        let start = self.start_ms.load(Ordering::Relaxed);
        StatsSnapshot {
            now_ms,
            elapsed_ms: now_ms.saturating_sub(start),
            fetches: self.fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            events_loaded: self.events_loaded.load(Ordering::Relaxed),
            odds_records: self.odds_records.load(Ordering::Relaxed),
            recommendations: self.recommendations.load(Ordering::Relaxed),
            degraded_results: self.degraded_results.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub now_ms: u64,
    pub elapsed_ms: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    pub events_loaded: u64,
    pub odds_records: u64,
    pub recommendations: u64,
    pub degraded_results: u64,
}
