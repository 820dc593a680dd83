// Scheduler engine implementation

use crate::errors::SchedulerError;
use crate::executor::PollExecutor;
use crate::models::{ConnectionConfig, JobState, JobStatus, MonitorConfig, TickOutcome};
use crate::telemetry;
use chrono::Utc;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Configuration for the scheduler engine
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How long `stop` waits for an in-flight poll before aborting its task
    pub shutdown_grace_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_seconds: 5,
        }
    }
}

/// Handle for one scheduled monitor job
struct JobHandle {
    state: watch::Receiver<JobState>,
    task: JoinHandle<()>,
}

/// Main scheduler engine
///
/// Materializes one independent recurring job per enabled monitor config.
/// Jobs live in an explicit map keyed by `monitor_{collection}`, owned by
/// this instance; there is no ambient global registry. Each job captures
/// its immutable config at creation, so a configuration change means
/// loading a fresh set and starting a new engine.
pub struct SchedulerEngine {
    config: SchedulerConfig,
    executor: Arc<dyn PollExecutor>,
    jobs: Mutex<HashMap<String, JobHandle>>,
    started: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

impl SchedulerEngine {
    /// Create a new scheduler engine
    pub fn new(config: SchedulerConfig, executor: Arc<dyn PollExecutor>) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Self {
            config,
            executor,
            jobs: Mutex::new(HashMap::new()),
            started: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// Spawn one recurring job per enabled monitor config.
    ///
    /// Returns the number of jobs created. Job identity is checked up
    /// front so a duplicate collection leaves nothing running.
    #[instrument(skip(self, connection, monitors))]
    pub async fn start(
        &self,
        connection: ConnectionConfig,
        monitors: Vec<MonitorConfig>,
    ) -> Result<usize, SchedulerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let enabled: Vec<MonitorConfig> = monitors.into_iter().filter(|m| m.enabled).collect();

        let mut names = HashSet::new();
        for monitor in &enabled {
            if !names.insert(monitor.job_name()) {
                self.started.store(false, Ordering::SeqCst);
                return Err(SchedulerError::DuplicateJob(monitor.job_name()));
            }
        }

        let connection = Arc::new(connection);
        let mut jobs = self.jobs.lock().await;

        for monitor in enabled {
            let name = monitor.job_name();
            let monitor = Arc::new(monitor);
            let (state_tx, state_rx) = watch::channel(JobState::default());
            let shutdown_rx = self.shutdown_tx.subscribe();

            let task = tokio::spawn(run_job(
                name.clone(),
                Arc::clone(&connection),
                monitor,
                Arc::clone(&self.executor),
                state_tx,
                shutdown_rx,
            ));

            jobs.insert(
                name,
                JobHandle {
                    state: state_rx,
                    task,
                },
            );
        }

        telemetry::set_active_jobs(jobs.len());
        info!(job_count = jobs.len(), "monitor jobs scheduled");
        Ok(jobs.len())
    }

    /// Cancel all jobs.
    ///
    /// Jobs idle on their timer stop immediately; a job mid-poll finishes
    /// its call first, and one stuck past the grace period is aborted.
    /// After this returns the job map is empty and no timer remains.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        info!("stopping scheduler engine");

        let _ = self.shutdown_tx.send(());

        let grace = Duration::from_secs(self.config.shutdown_grace_seconds);
        let mut jobs = self.jobs.lock().await;
        let drained: Vec<(String, JobHandle)> = jobs.drain().collect();

        join_all(drained.into_iter().map(|(name, mut handle)| async move {
            match tokio::time::timeout(grace, &mut handle.task).await {
                Ok(Ok(())) => debug!(job = %name, "job stopped"),
                Ok(Err(e)) => warn!(job = %name, error = %e, "job task ended abnormally"),
                Err(_) => {
                    warn!(job = %name, "job did not stop within grace period, aborting");
                    handle.task.abort();
                    let _ = (&mut handle.task).await;
                }
            }
        }))
        .await;

        telemetry::set_active_jobs(0);
        info!("scheduler engine stopped");
    }

    /// Names of the currently scheduled jobs, sorted.
    pub async fn job_names(&self) -> Vec<String> {
        let jobs = self.jobs.lock().await;
        let mut names: Vec<String> = jobs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Last-known run status of one job, by job name.
    pub async fn job_state(&self, name: &str) -> Option<JobState> {
        let jobs = self.jobs.lock().await;
        jobs.get(name).map(|handle| handle.state.borrow().clone())
    }
}

/// Recurring loop for one monitor job.
async fn run_job(
    name: String,
    connection: Arc<ConnectionConfig>,
    monitor: Arc<MonitorConfig>,
    executor: Arc<dyn PollExecutor>,
    state: watch::Sender<JobState>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let period = Duration::from_millis(monitor.interval_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    // Single-flight guard: the poll below is awaited inline, so a second
    // poll can never start while one is outstanding, and Skip drops ticks
    // that came due during a slow poll instead of queueing a burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        job = %name,
        collection = %monitor.collection,
        interval_ms = monitor.interval_ms,
        "monitor job started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_tick(&name, &connection, &monitor, executor.as_ref(), &state).await;
            }
            _ = shutdown.recv() => {
                info!(job = %name, "monitor job stopped");
                break;
            }
        }
    }
}

/// One tick: `Idle -> Running -> Idle` with the outcome recorded.
async fn run_tick(
    name: &str,
    connection: &ConnectionConfig,
    monitor: &MonitorConfig,
    executor: &dyn PollExecutor,
    state: &watch::Sender<JobState>,
) {
    state.send_modify(|s| s.status = JobStatus::Running);
    let started = std::time::Instant::now();

    // No retry on failure; the next natural tick is the recovery mechanism.
    let outcome = match executor.execute(connection, monitor).await {
        Ok(()) => {
            debug!(job = %name, collection = %monitor.collection, "poll cycle succeeded");
            telemetry::record_poll_success(&monitor.collection);
            TickOutcome::Success
        }
        Err(e) => {
            warn!(
                job = %name,
                collection = %monitor.collection,
                error = %e,
                "poll cycle failed"
            );
            telemetry::record_poll_failure(&monitor.collection, e.reason_label());
            TickOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    telemetry::record_poll_duration(&monitor.collection, started.elapsed().as_secs_f64());

    state.send_modify(|s| {
        s.status = JobStatus::Idle;
        s.ticks_completed += 1;
        s.last_outcome = Some(outcome);
        s.last_finished_at = Some(Utc::now());
    });
}
