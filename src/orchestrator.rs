//! Run orchestration.
//!
//! The [`Orchestrator`] owns one load test run from configuration to
//! summary:
//!
//! ```text
//! Initializing ─▶ Bootstrapping ─▶ Running ─▶ Completing ─▶ Complete
//!      │                │                           │
//!      └────────────────┴───────────────────────────┴─────▶ Error
//! ```
//!
//! While running, every provisioned identity gets its own tokio task with an
//! [`ActorSimulator`]. All actors share a child of the caller's shutdown
//! token, which is also cancelled when `limits.max_duration_secs` elapses.

use crate::actor::{ActorDisposition, ActorPlan, ActorReport, ActorSimulator};
use crate::bootstrap::IdentityProvider;
use crate::error::LoadTestError;
use crate::metrics::MetricsSink;
use crate::transport::ChatTransport;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use loadtest_core::{derive_seed, LoadTestConfig};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle phase of a run, reported through the metrics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Initializing,
    Bootstrapping,
    Running,
    Completing,
    Complete,
    Error,
}

/// Identity of one run, handed to the identity provider.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// `test-YYYYMMDD-HHMMSS-xxxxxxxx`
    pub run_id: String,
    /// `worker-{hostname}-xxxxxxxx`
    pub worker_id: String,
    pub started_at: DateTime<Utc>,
    /// Base seed; per-actor seeds are derived from it.
    pub seed: u64,
    pub config: Arc<LoadTestConfig>,
}

impl RunContext {
    pub fn new(config: impl Into<Arc<LoadTestConfig>>) -> Self {
        let config = config.into();
        let started_at = Utc::now();

        let run_id = format!(
            "test-{}-{}",
            started_at.format("%Y%m%d-%H%M%S"),
            short_id()
        );
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());
        let worker_id = format!("worker-{host}-{}", short_id());

        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = started_at.timestamp_nanos_opt().unwrap_or_default() as u64;
                info!(seed, "No seed configured, using start time");
                seed
            }
        };

        Self {
            run_id,
            worker_id,
            started_at,
            seed,
            config,
        }
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Why the running phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every actor finished its session.
    Completed,
    /// The caller's shutdown token was cancelled.
    Shutdown,
    /// `limits.max_duration_secs` elapsed.
    MaxDuration,
    /// `limits.max_requests` was used up.
    RequestLimit,
}

/// Aggregate pass/fail rule over actor dispositions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailurePolicy {
    ratio: f64,
}

impl FailurePolicy {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// The run fails when strictly more than `ratio * total` actors erred.
    pub fn is_failed(&self, erroring: usize, total: usize) -> bool {
        total > 0 && erroring as f64 > total as f64 * self.ratio
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Counters shared by every actor of a run.
#[derive(Debug)]
pub struct RunCounters {
    requests_issued: AtomicU64,
    requests_failed: AtomicU64,
    active_actors: AtomicUsize,
    max_requests: Option<u64>,
    drained: CancellationToken,
}

impl RunCounters {
    pub fn new(max_requests: Option<u64>) -> Self {
        Self {
            requests_issued: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            active_actors: AtomicUsize::new(0),
            max_requests,
            drained: CancellationToken::new(),
        }
    }

    /// Reserve one request from the run budget. Returns `false` once the
    /// budget is used up.
    pub fn try_acquire_request(&self) -> bool {
        let Some(limit) = self.max_requests else {
            self.requests_issued.fetch_add(1, Ordering::SeqCst);
            return true;
        };

        let acquired = self
            .requests_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |issued| {
                (issued < limit).then_some(issued + 1)
            });
        match acquired {
            Ok(previous) => {
                if previous + 1 >= limit {
                    self.drained.cancel();
                }
                true
            }
            Err(_) => {
                self.drained.cancel();
                false
            }
        }
    }

    pub fn record_failed_request(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::SeqCst)
    }

    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    pub fn active_actors(&self) -> usize {
        self.active_actors.load(Ordering::SeqCst)
    }

    /// Whether `max_requests` has been reached.
    pub fn budget_exhausted(&self) -> bool {
        self.drained.is_cancelled()
    }

    /// Resolves once the request budget is used up. Never resolves for an
    /// unlimited run.
    pub async fn budget_drained(&self) {
        self.drained.cancelled().await
    }

    fn actor_started(&self) -> usize {
        self.active_actors.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn actor_finished(&self) -> usize {
        self.active_actors.fetch_sub(1, Ordering::SeqCst).saturating_sub(1)
    }
}

/// Keeps the active-actor gauge in step with running actor tasks, including
/// tasks that panic.
struct ActiveActorGuard {
    counters: Arc<RunCounters>,
    metrics: Arc<dyn MetricsSink>,
}

impl ActiveActorGuard {
    fn new(counters: Arc<RunCounters>, metrics: Arc<dyn MetricsSink>) -> Self {
        metrics.set_active_actors(counters.actor_started());
        Self { counters, metrics }
    }
}

impl Drop for ActiveActorGuard {
    fn drop(&mut self) {
        self.metrics.set_active_actors(self.counters.actor_finished());
    }
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub worker_id: String,
    pub seed: u64,
    pub total_actors: usize,
    pub completed_actors: usize,
    /// Actors that reported any error, canceled ones included. This is the
    /// count the failure policy is applied to.
    pub failed_actors: usize,
    /// Canceled actors, also counted in `failed_actors`.
    pub canceled_actors: usize,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub stop_reason: StopReason,
    pub run_failed: bool,
    pub duration: Duration,
    pub actors: Vec<ActorReport>,
}

impl RunSummary {
    fn count(actors: &[ActorReport], keep: impl Fn(ActorDisposition) -> bool) -> usize {
        actors.iter().filter(|a| keep(a.disposition)).count()
    }
}

/// Drives one load test run.
pub struct Orchestrator {
    config: LoadTestConfig,
    provider: Arc<dyn IdentityProvider>,
    transport: Arc<dyn ChatTransport>,
    metrics: Arc<dyn MetricsSink>,
}

impl Orchestrator {
    pub fn new(
        config: LoadTestConfig,
        provider: Arc<dyn IdentityProvider>,
        transport: Arc<dyn ChatTransport>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            config,
            provider,
            transport,
            metrics,
        }
    }

    /// Run to completion without external shutdown.
    pub async fn run(self) -> Result<RunSummary, LoadTestError> {
        self.run_until_cancelled(CancellationToken::new()).await
    }

    /// Run until every actor finishes or `shutdown` is cancelled.
    pub async fn run_until_cancelled(
        self,
        shutdown: CancellationToken,
    ) -> Result<RunSummary, LoadTestError> {
        let Orchestrator {
            config,
            provider,
            transport,
            metrics,
        } = self;
        let started = Instant::now();

        metrics.set_run_phase(RunPhase::Initializing);
        if let Err(e) = config.validate() {
            error!(error = %e, "Invalid load test configuration");
            metrics.set_run_phase(RunPhase::Error);
            return Err(e.into());
        }
        let ctx = RunContext::new(config);
        info!(
            run_id = %ctx.run_id,
            worker_id = %ctx.worker_id,
            seed = ctx.seed,
            name = %ctx.config.name,
            "Starting load test run"
        );

        metrics.set_run_phase(RunPhase::Bootstrapping);
        let identities = match provider.provision(&ctx).await {
            Ok(identities) => identities,
            Err(e) => {
                error!(run_id = %ctx.run_id, error = %format!("{e:#}"), "Bootstrap failed");
                metrics.set_run_phase(RunPhase::Error);
                return Err(LoadTestError::Bootstrap(e));
            }
        };
        if identities.is_empty() {
            warn!(run_id = %ctx.run_id, "No identities provisioned");
        }

        metrics.set_run_phase(RunPhase::Running);
        let limits = &ctx.config.limits;
        let run_token = shutdown.child_token();
        let counters = Arc::new(RunCounters::new(limits.max_requests));
        let plan = Arc::new(ActorPlan::from_config(&ctx.config));
        let deadline_hit = Arc::new(AtomicBool::new(false));

        let deadline_task = limits.max_duration_secs.map(|secs| {
            spawn_deadline(
                run_token.clone(),
                Duration::from_secs(secs),
                Arc::clone(&deadline_hit),
            )
        });
        let progress_task = (limits.progress_interval_secs > 0).then(|| {
            spawn_progress_reporter(
                Arc::clone(&counters),
                Duration::from_secs(limits.progress_interval_secs),
            )
        });

        let total_actors = identities.len();
        let stagger = Duration::from_millis(limits.stagger_ms);
        let mut handles = Vec::with_capacity(total_actors);
        let mut unstarted = Vec::new();

        for (idx, identity) in identities.into_iter().enumerate() {
            if idx > 0 && !stagger.is_zero() {
                tokio::select! {
                    biased;
                    _ = run_token.cancelled() => {}
                    _ = tokio::time::sleep(stagger) => {}
                }
            }
            if run_token.is_cancelled() {
                debug!(identity_id = %identity.identity_id, "Run canceled before actor start");
                unstarted.push(ActorReport::aborted(
                    identity.identity_id,
                    ActorDisposition::Canceled,
                ));
                continue;
            }

            let identity_id = identity.identity_id.clone();
            let guard = ActiveActorGuard::new(Arc::clone(&counters), Arc::clone(&metrics));
            let actor = ActorSimulator::new(
                Arc::new(identity),
                derive_seed(ctx.seed, idx as u64),
                Arc::clone(&plan),
                Arc::clone(&transport),
                Arc::clone(&metrics),
                Arc::clone(&counters),
                run_token.clone(),
            );
            let handle = tokio::spawn(async move {
                let _guard = guard;
                actor.run().await
            });
            handles.push((identity_id, handle));
        }

        info!(
            spawned = handles.len(),
            unstarted = unstarted.len(),
            "All actors launched"
        );

        let mut actors = join_all(handles.into_iter().map(|(identity_id, handle)| async move {
            match handle.await {
                Ok(report) => report,
                Err(e) => {
                    error!(identity_id = %identity_id, error = %e, "Actor task failed");
                    ActorReport::aborted(identity_id, ActorDisposition::Failed)
                }
            }
        }))
        .await;
        actors.extend(unstarted);

        metrics.set_run_phase(RunPhase::Completing);
        if let Some(task) = deadline_task {
            task.abort();
        }
        if let Some(task) = progress_task {
            task.abort();
        }

        let stop_reason = if deadline_hit.load(Ordering::SeqCst) {
            StopReason::MaxDuration
        } else if run_token.is_cancelled() {
            StopReason::Shutdown
        } else if counters.budget_exhausted() {
            StopReason::RequestLimit
        } else {
            StopReason::Completed
        };

        let mut summary = RunSummary {
            run_id: ctx.run_id.clone(),
            worker_id: ctx.worker_id.clone(),
            seed: ctx.seed,
            total_actors,
            completed_actors: RunSummary::count(&actors, |d| !d.is_error()),
            failed_actors: RunSummary::count(&actors, |d| d.is_error()),
            canceled_actors: RunSummary::count(&actors, |d| d == ActorDisposition::Canceled),
            total_requests: counters.requests_issued(),
            failed_requests: counters.requests_failed(),
            stop_reason,
            run_failed: false,
            duration: started.elapsed(),
            actors,
        };
        let policy = FailurePolicy::new(limits.majority_failure_ratio);
        summary.run_failed = policy.is_failed(summary.failed_actors, summary.total_actors);

        info!(
            run_id = %summary.run_id,
            stop_reason = ?summary.stop_reason,
            total_actors = summary.total_actors,
            completed = summary.completed_actors,
            failed = summary.failed_actors,
            canceled = summary.canceled_actors,
            requests = summary.total_requests,
            failed_requests = summary.failed_requests,
            duration_ms = summary.duration.as_millis() as u64,
            "Load test run finished"
        );

        if summary.run_failed {
            error!(
                run_id = %summary.run_id,
                failed = summary.failed_actors,
                total = summary.total_actors,
                "Majority of actors failed"
            );
            metrics.set_run_phase(RunPhase::Error);
            return Err(LoadTestError::MajorityFailed(Box::new(summary)));
        }

        metrics.set_run_phase(RunPhase::Complete);
        Ok(summary)
    }
}

fn spawn_deadline(
    token: CancellationToken,
    after: Duration,
    hit: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(after) => {
                warn!(
                    max_duration_secs = after.as_secs(),
                    "Max duration reached, canceling actors"
                );
                hit.store(true, Ordering::SeqCst);
                token.cancel();
            }
        }
    })
}

fn spawn_progress_reporter(counters: Arc<RunCounters>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            info!(
                requests = counters.requests_issued(),
                failed = counters.requests_failed(),
                active_actors = counters.active_actors(),
                "Load test progress"
            );
        }
    })
}

/// Cancel `token` when the process receives Ctrl+C.
pub fn shutdown_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down load test");
                    token.cancel();
                }
                Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
            }
        }
    })
}
