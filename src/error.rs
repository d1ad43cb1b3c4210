//! Error types for the simulation engine.

use crate::orchestrator::RunSummary;
use crate::transport::TransportError;
use loadtest_core::ConfigError;
use thiserror::Error;

/// Errors that end a load test run.
#[derive(Error, Debug)]
pub enum LoadTestError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identity provisioning failed before any actor started.
    #[error("Bootstrap failed: {0:#}")]
    Bootstrap(#[source] anyhow::Error),

    /// More actors failed than the failure policy tolerates.
    #[error(
        "Run failed: {} of {} actors reported errors",
        .0.failed_actors,
        .0.total_actors
    )]
    MajorityFailed(Box<RunSummary>),
}

impl LoadTestError {
    /// Summary of the finished run, when the run got that far.
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            LoadTestError::MajorityFailed(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Reasons an actor stops before finishing its session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// Shutdown or deadline observed.
    #[error("Actor canceled")]
    Canceled,

    /// The transport reported a failure that ends the session.
    #[error("Fatal transport error: {0}")]
    Fatal(TransportError),
}
