//! Cron-driven trigger for the meeting status sweep.
//!
//! Each tick runs one sweep under a timeout. Failures and timeouts are logged
//! and counted; the next tick simply tries again. Join handles are tracked
//! and cancellation is explicit.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use meetsched_core::StatusTransitionEngine;
//! use meetsched_infra::scheduling::{SchedulerResult, SweepScheduler, SweepSchedulerConfig};
//!
//! # async fn example(engine: Arc<StatusTransitionEngine>) -> SchedulerResult<()> {
//! let mut scheduler = SweepScheduler::with_config(
//!     SweepSchedulerConfig {
//!         cron_expression: "0 * * * * *".into(), // every minute
//!         ..Default::default()
//!     },
//!     engine,
//! )
//! .await?;
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use meetsched_core::StatusTransitionEngine;
use meetsched_domain::constants::{DEFAULT_SWEEP_CRON, DEFAULT_SWEEP_TIMEOUT_SECS};
use meetsched_domain::{MeetSchedError, SchedulingConfig, SweepReport};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// One execution of the status sweep.
#[async_trait]
pub trait SweepJob: Send + Sync {
    async fn run(&self) -> Result<SweepReport, MeetSchedError>;
}

#[async_trait]
impl SweepJob for StatusTransitionEngine {
    async fn run(&self) -> Result<SweepReport, MeetSchedError> {
        self.run_sweep().await
    }
}

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone)]
pub struct SweepSchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    /// Timeout applied to a single sweep.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for SweepSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_SWEEP_CRON.into(),
            job_timeout: Duration::from_secs(DEFAULT_SWEEP_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SchedulingConfig> for SweepSchedulerConfig {
    fn from(config: &SchedulingConfig) -> Self {
        Self {
            cron_expression: config.sweep_cron.clone(),
            job_timeout: Duration::from_secs(config.sweep_timeout_secs.max(1)),
            ..Self::default()
        }
    }
}

/// Snapshot of sweep execution counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub runs: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub last_report: Option<SweepReport>,
}

#[derive(Debug, Default)]
struct StatsRecorder {
    runs: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    last_report: Mutex<Option<SweepReport>>,
}

impl StatsRecorder {
    fn snapshot(&self) -> SweepStats {
        SweepStats {
            runs: self.runs.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            last_report: *self.last_report.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn record_success(&self, report: SweepReport) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        *self.last_report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
    }

    fn record_failure(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_timeout(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sweep scheduler with explicit lifecycle management.
pub struct SweepScheduler {
    scheduler: Arc<RwLock<JobScheduler>>,
    config: SweepSchedulerConfig,
    job_id: Uuid,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    stats: Arc<StatsRecorder>,
    job: Arc<dyn SweepJob>,
}

impl SweepScheduler {
    /// Create a scheduler with the default timeouts.
    pub async fn new(cron_expression: String, job: Arc<dyn SweepJob>) -> SchedulerResult<Self> {
        let config = SweepSchedulerConfig { cron_expression, ..SweepSchedulerConfig::default() };
        Self::with_config(config, job).await
    }

    /// Create a scheduler with a custom configuration. Fails if the cron
    /// expression is rejected.
    pub async fn with_config(
        config: SweepSchedulerConfig,
        job: Arc<dyn SweepJob>,
    ) -> SchedulerResult<Self> {
        let raw_scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed { source })?;

        let mut scheduler = Self {
            scheduler: Arc::new(RwLock::new(raw_scheduler)),
            config,
            job_id: Uuid::nil(),
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            stats: Arc::new(StatsRecorder::default()),
            job,
        };

        scheduler.job_id = scheduler.register_sweep_job().await?;
        Ok(scheduler)
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler = self.scheduler.clone();
        let start_timeout = self.config.start_timeout;
        let start_result = tokio::time::timeout(start_timeout, async move {
            let guard = scheduler.write().await;
            guard.start().await
        })
        .await
        .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?;

        start_result.map_err(|source| SchedulerError::StartFailed { source })?;

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(cron = %self.config.cron_expression, "Sweep scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let scheduler = self.scheduler.clone();
        let stop_timeout = self.config.stop_timeout;
        let stop_result = tokio::time::timeout(stop_timeout, async move {
            let mut guard = scheduler.write().await;
            guard.shutdown().await
        })
        .await
        .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?;

        stop_result.map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??
        }

        info!(stats = ?self.stats(), "Sweep scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when the monitor task is active.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Run one sweep immediately, outside the cron schedule.
    pub async fn run_once(&self) -> SchedulerResult<SweepReport> {
        execute_sweep(self.job.as_ref(), &self.stats, self.config.job_timeout).await
    }

    pub fn stats(&self) -> SweepStats {
        self.stats.snapshot()
    }

    async fn register_sweep_job(&mut self) -> SchedulerResult<Uuid> {
        if self.job_id != Uuid::nil() {
            return Ok(self.job_id);
        }

        let stats = self.stats.clone();
        let job = self.job.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition =
            Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
                let stats = stats.clone();
                let job = job.clone();

                Box::pin(async move {
                    // Outcome is already logged and counted.
                    let _ = execute_sweep(job.as_ref(), &stats, job_timeout).await;
                })
            })
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        let scheduler = self.scheduler.write().await;
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered status sweep job");
        Ok(job_id)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Sweep scheduler monitor cancelled");
    }
}

async fn execute_sweep(
    job: &dyn SweepJob,
    stats: &StatsRecorder,
    job_timeout: Duration,
) -> SchedulerResult<SweepReport> {
    let started = Instant::now();

    match tokio::time::timeout(job_timeout, job.run()).await {
        Ok(Ok(report)) => {
            stats.record_success(report);
            debug!(
                started = report.started,
                completed = report.completed,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Status sweep finished"
            );
            Ok(report)
        }
        Ok(Err(err)) => {
            stats.record_failure();
            error!(error = %err, kind = err.label(), "Status sweep failed");
            Err(SchedulerError::JobFailed(err))
        }
        Err(source) => {
            stats.record_timeout();
            warn!(timeout_secs = job_timeout.as_secs(), "Status sweep timed out");
            Err(SchedulerError::Timeout { duration: job_timeout, source })
        }
    }
}

impl Drop for SweepScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SweepScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
