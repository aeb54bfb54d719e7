// Application state module
// Holds configuration, injected integrations and runtime counters

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::types::Config;
use crate::integrations::{DiseaseAnalyzer, MockAnalyzer, MockSprayer, SprayerController};

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub analyzer: Arc<dyn DiseaseAnalyzer>,
    pub sprayer: Arc<dyn SprayerController>,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,

    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    requests_processed: AtomicU64,
}

impl AppState {
    /// Create `AppState` backed by the mock analyzer and sprayer
    pub fn new(config: Config) -> Self {
        let analyzer = Arc::new(MockAnalyzer::from_config(&config.analyzer));
        let sprayer = Arc::new(MockSprayer::from_config(&config.sprayer));
        Self::with_integrations(config, analyzer, sprayer)
    }

    /// Create `AppState` with caller-supplied integrations
    pub fn with_integrations(
        config: Config,
        analyzer: Arc<dyn DiseaseAnalyzer>,
        sprayer: Arc<dyn SprayerController>,
    ) -> Self {
        let cached_access_log = AtomicBool::new(config.logging.access_log);
        Self {
            config,
            analyzer,
            sprayer,
            cached_access_log,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            requests_processed: AtomicU64::new(0),
        }
    }

    /// Count a request, returning the new total
    pub fn record_request(&self) -> u64 {
        self.requests_processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_processed(&self) -> u64 {
        self.requests_processed.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub const fn started_at(&self) -> &DateTime<Utc> {
        &self.started_at_utc
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }
}
