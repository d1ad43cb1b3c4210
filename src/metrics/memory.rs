//! In-process metrics sink.

use super::MetricsSink;
use crate::orchestrator::RunPhase;
use loadtest_core::{ErrorKind, Identity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Price used for models missing from the table, USD per million tokens.
const DEFAULT_PRICE_PER_MILLION: f64 = 5.0;

/// Blended input/output list prices, USD per million tokens.
const PRICE_PER_MILLION: &[(&str, f64)] = &[
    ("gpt-4o", 5.0),
    ("gpt-4", 30.0),
    ("gpt-3.5-turbo", 0.5),
    ("claude-3-opus", 15.0),
    ("claude-3-sonnet", 3.0),
];

/// Estimated cost of `tokens` on `model`.
pub fn estimate_cost_usd(model: &str, tokens: u64) -> f64 {
    let price = PRICE_PER_MILLION
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_PRICE_PER_MILLION);
    tokens as f64 / 1_000_000.0 * price
}

#[derive(Debug, Default)]
struct ModelStats {
    requests: u64,
    failed: u64,
    tokens: u64,
    latency_total: Duration,
    ttft_total: Duration,
    tps_total: f64,
    timing_samples: u64,
}

/// Per-model slice of a [`MetricsSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub requests: u64,
    pub failed: u64,
    pub tokens: u64,
    pub estimated_cost_usd: f64,
    pub mean_latency_ms: f64,
    pub mean_ttft_ms: Option<f64>,
    pub mean_tokens_per_second: Option<f64>,
}

/// Point-in-time view of everything recorded so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub phase: RunPhase,
    pub active_actors: usize,
    pub requests_total: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub tokens_total: u64,
    pub estimated_cost_usd: f64,
    pub llm_timing_samples: u64,
    pub models: BTreeMap<String, ModelSnapshot>,
    pub errors: BTreeMap<String, u64>,
}

/// Metrics sink that keeps counters in memory.
///
/// Hot counters are atomics; the per-model and per-error tables sit behind
/// mutexes held only for a map update. Cloning is cheap and every clone
/// shares the same counters.
#[derive(Clone, Default)]
pub struct InMemoryMetrics {
    requests_total: Arc<AtomicU64>,
    requests_failed: Arc<AtomicU64>,
    tokens_total: Arc<AtomicU64>,
    llm_timing_samples: Arc<AtomicU64>,
    active_actors: Arc<AtomicUsize>,
    phases: Arc<Mutex<Vec<RunPhase>>>,
    models: Arc<Mutex<HashMap<String, ModelStats>>>,
    errors: Arc<Mutex<HashMap<ErrorKind, u64>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock leaves counters that are still usable.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn requests_failed(&self) -> u64 {
        self.requests_failed.load(Ordering::Relaxed)
    }

    pub fn active_actors(&self) -> usize {
        self.active_actors.load(Ordering::Relaxed)
    }

    /// Every phase reported so far, in order.
    pub fn phase_history(&self) -> Vec<RunPhase> {
        locked(&self.phases).clone()
    }

    /// Most recently reported phase.
    pub fn phase(&self) -> RunPhase {
        locked(&self.phases)
            .last()
            .copied()
            .unwrap_or(RunPhase::Initializing)
    }

    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        locked(&self.errors).get(&kind).copied().unwrap_or(0)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests_total = self.requests_total();
        let requests_failed = self.requests_failed();

        let models: BTreeMap<String, ModelSnapshot> = locked(&self.models)
            .iter()
            .map(|(model, stats)| {
                let mean_latency_ms = if stats.requests > 0 {
                    stats.latency_total.as_secs_f64() * 1000.0 / stats.requests as f64
                } else {
                    0.0
                };
                let (mean_ttft_ms, mean_tps) = if stats.timing_samples > 0 {
                    let samples = stats.timing_samples as f64;
                    (
                        Some(stats.ttft_total.as_secs_f64() * 1000.0 / samples),
                        Some(stats.tps_total / samples),
                    )
                } else {
                    (None, None)
                };
                let snapshot = ModelSnapshot {
                    requests: stats.requests,
                    failed: stats.failed,
                    tokens: stats.tokens,
                    estimated_cost_usd: estimate_cost_usd(model, stats.tokens),
                    mean_latency_ms,
                    mean_ttft_ms,
                    mean_tokens_per_second: mean_tps,
                };
                (model.clone(), snapshot)
            })
            .collect();

        let errors = locked(&self.errors)
            .iter()
            .map(|(kind, count)| (kind.to_string(), *count))
            .collect();

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            phase: self.phase(),
            active_actors: self.active_actors(),
            requests_total,
            requests_succeeded: requests_total.saturating_sub(requests_failed),
            requests_failed,
            tokens_total: self.tokens_total.load(Ordering::Relaxed),
            estimated_cost_usd: models.values().map(|m| m.estimated_cost_usd).sum(),
            llm_timing_samples: self.llm_timing_samples.load(Ordering::Relaxed),
            models,
            errors,
        }
    }

    /// Append a JSON snapshot line to `output_path` every `interval`.
    ///
    /// The task runs until aborted or until a write fails.
    pub fn start_emission_task(
        &self,
        output_path: PathBuf,
        interval: Duration,
    ) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        let metrics = self.clone();

        tokio::spawn(async move {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&output_path)
                .await?;

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                let json_line = serde_json::to_string(&metrics.snapshot())?;
                file.write_all(json_line.as_bytes()).await?;
                file.write_all(b"\n").await?;
                file.flush().await?;
            }
        })
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record_request_outcome(
        &self,
        _identity: &Identity,
        model: &str,
        latency: Duration,
        tokens: u64,
        success: bool,
        error_kind: Option<ErrorKind>,
    ) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.tokens_total.fetch_add(tokens, Ordering::Relaxed);
        if !success {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }

        {
            let mut models = locked(&self.models);
            let stats = models.entry(model.to_string()).or_default();
            stats.requests += 1;
            stats.tokens += tokens;
            stats.latency_total += latency;
            if !success {
                stats.failed += 1;
            }
        }

        if let Some(kind) = error_kind {
            *locked(&self.errors).entry(kind).or_insert(0) += 1;
        }
    }

    fn record_llm_timing(&self, _identity: &Identity, model: &str, ttft: Duration, tps: f64) {
        self.llm_timing_samples.fetch_add(1, Ordering::Relaxed);

        let mut models = locked(&self.models);
        let stats = models.entry(model.to_string()).or_default();
        stats.ttft_total += ttft;
        stats.tps_total += tps;
        stats.timing_samples += 1;
    }

    fn set_run_phase(&self, phase: RunPhase) {
        locked(&self.phases).push(phase);
    }

    fn set_active_actors(&self, count: usize) {
        self.active_actors.store(count, Ordering::Relaxed);
    }
}
