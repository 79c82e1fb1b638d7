use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use meetsched_core::MockClock;
use meetsched_domain::{Config, DatabaseConfig};
use meetsched_lib::AppContext;
use tempfile::TempDir;

pub const ALICE: &str = "instructor-alice";

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
}

/// Application context over a throwaway database file and a mock clock.
pub struct TestApp {
    pub ctx: AppContext,
    pub clock: Arc<MockClock>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new(now: DateTime<Utc>) -> Self {
        Self::with_config(now, |_| {}).await
    }

    pub async fn with_config(now: DateTime<Utc>, customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = temp_dir.path().join("meetsched-app.db");

        let mut config = Config {
            database: DatabaseConfig { path: path.display().to_string(), pool_size: 2 },
            ..Config::default()
        };
        customize(&mut config);

        let clock = Arc::new(MockClock::new(now));
        let ctx = AppContext::with_clock(config, clock.clone())
            .await
            .expect("context should initialize");

        Self { ctx, clock, _temp_dir: temp_dir }
    }
}
