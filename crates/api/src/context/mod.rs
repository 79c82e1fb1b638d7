//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use meetsched_core::{
    parse_timezone, Authorizer, CalendarQueryService, Clock, CreatorOrAdmin, MeetingRepository,
    SchedulingService, StatusTransitionEngine, SystemClock,
};
use meetsched_domain::{Config, MeetSchedError, Result};
use meetsched_infra::{DbManager, SqliteMeetingRepository, SweepScheduler, SweepSchedulerConfig};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Upper bound on scheduler start-up before the process gives up on it.
const SCHEDULER_START_TIMEOUT: Duration = Duration::from_secs(10);

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub scheduling: Arc<SchedulingService>,
    pub calendar: Arc<CalendarQueryService>,
    pub status: Arc<StatusTransitionEngine>,

    // Started on demand so one-shot invocations never spawn cron tasks.
    sweep_scheduler: Mutex<Option<SweepScheduler>>,
}

impl AppContext {
    /// Open the database, apply migrations and wire services against the
    /// system clock.
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Same as [`AppContext::new`] with an injected clock.
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let timezone = parse_timezone(&config.scheduling.timezone)?;

        let db_config = config.database.clone();
        let db = tokio::task::spawn_blocking(move || -> Result<DbManager> {
            let db = DbManager::from_config(&db_config)?;
            db.run_migrations()?;
            Ok(db)
        })
        .await
        .map_err(|err| MeetSchedError::Internal(format!("database setup task failed: {err}")))??;
        let db = Arc::new(db);
        info!(path = %db.path().display(), "database ready");

        let repository: Arc<dyn MeetingRepository> =
            Arc::new(SqliteMeetingRepository::new(db.clone()));
        let authorizer: Arc<dyn Authorizer> = Arc::new(CreatorOrAdmin);

        let scheduling =
            Arc::new(SchedulingService::new(repository.clone(), authorizer, clock.clone()));
        let calendar =
            Arc::new(CalendarQueryService::new(repository.clone(), clock.clone(), timezone));
        let status = Arc::new(StatusTransitionEngine::new(repository, clock));

        Ok(Self {
            config,
            db,
            scheduling,
            calendar,
            status,
            sweep_scheduler: Mutex::new(None),
        })
    }

    /// Start the periodic status sweep. A no-op when the sweep is disabled in
    /// configuration or already running.
    pub async fn start_sweeper(&self) -> Result<()> {
        if !self.config.scheduling.sweep_enabled {
            info!("status sweep disabled by configuration");
            return Ok(());
        }

        let mut slot = self.sweep_scheduler.lock().await;
        if slot.as_ref().is_some_and(SweepScheduler::is_running) {
            return Ok(());
        }

        let config = SweepSchedulerConfig::from(&self.config.scheduling);
        let mut scheduler = SweepScheduler::with_config(config, self.status.clone())
            .await
            .map_err(|err| {
                error!(error = %err, "failed to construct SweepScheduler");
                MeetSchedError::from(err)
            })?;

        tokio::time::timeout(SCHEDULER_START_TIMEOUT, scheduler.start())
            .await
            .map_err(|_| {
                let timeout_secs = SCHEDULER_START_TIMEOUT.as_secs();
                error!(timeout_secs, "SweepScheduler start timed out");
                MeetSchedError::Internal(format!(
                    "SweepScheduler start timed out after {}s",
                    SCHEDULER_START_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|err| {
                error!(error = %err, "failed to start SweepScheduler");
                MeetSchedError::from(err)
            })?;

        info!(cron = %self.config.scheduling.sweep_cron, "status sweep scheduled");
        *slot = Some(scheduler);
        Ok(())
    }

    pub async fn sweeper_running(&self) -> bool {
        self.sweep_scheduler.lock().await.as_ref().is_some_and(SweepScheduler::is_running)
    }

    /// Stop background work. Safe to call more than once.
    pub async fn shutdown(&self) {
        let scheduler = self.sweep_scheduler.lock().await.take();
        if let Some(mut scheduler) = scheduler {
            if let Err(err) = scheduler.stop().await {
                warn!(error = %err, "SweepScheduler did not stop cleanly");
            }
        }
        info!("application context shut down");
    }

    /// Verify the database answers queries.
    pub async fn health_check(&self) -> Result<()> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.health_check())
            .await
            .map_err(|err| MeetSchedError::Internal(format!("health check task failed: {err}")))?
    }
}
