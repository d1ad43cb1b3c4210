//! Metrics recording surface.
//!
//! Actors and the orchestrator report through the narrow [`MetricsSink`]
//! trait. Sinks are shared across every actor task, so implementations must
//! synchronize internally; none of the methods are async and none may block
//! for long.

mod memory;

pub use memory::{estimate_cost_usd, InMemoryMetrics, MetricsSnapshot, ModelSnapshot};

use crate::orchestrator::RunPhase;
use loadtest_core::{ErrorKind, Identity};
use std::time::Duration;

/// Receives per-request outcomes and run lifecycle signals.
pub trait MetricsSink: Send + Sync {
    /// One finished request, successful or not.
    fn record_request_outcome(
        &self,
        identity: &Identity,
        model: &str,
        latency: Duration,
        tokens: u64,
        success: bool,
        error_kind: Option<ErrorKind>,
    );

    /// Time to first token and generation throughput for a successful reply.
    fn record_llm_timing(&self, identity: &Identity, model: &str, ttft: Duration, tps: f64);

    fn set_run_phase(&self, phase: RunPhase);

    fn set_active_actors(&self, count: usize);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_request_outcome(
        &self,
        _identity: &Identity,
        _model: &str,
        _latency: Duration,
        _tokens: u64,
        _success: bool,
        _error_kind: Option<ErrorKind>,
    ) {
    }

    fn record_llm_timing(&self, _identity: &Identity, _model: &str, _ttft: Duration, _tps: f64) {}

    fn set_run_phase(&self, _phase: RunPhase) {}

    fn set_active_actors(&self, _count: usize) {}
}
