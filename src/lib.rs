//! chat-loadtest Library
//!
//! A concurrent per-user simulation engine for load testing chat-completion
//! services. Each provisioned user becomes an actor that asks synthesized
//! questions, waits on the reply, thinks, and asks again, while the
//! orchestrator enforces shutdown, deadlines and the run-level failure
//! policy.
//!
//! # Features
//!
//! - Deterministic replay: every actor derives its randomness from the run seed
//! - Weighted test profiles with per-profile question strategy and model routing
//! - Multi-turn conversations with configurable continuation probability
//! - Cooperative cancellation from Ctrl+C, a max duration, or a request budget
//! - Pluggable collaborators: identity provider, chat transport, metrics sink
//!
//! # Workspace Crates
//!
//! - `loadtest_core` - configuration, seeded randomness, think time, shared types
//! - `loadtest_questions` - strategy templates and the per-actor question generator
//!
//! # Example
//!
//! ```rust,no_run
//! use chat_loadtest::{
//!     shutdown_on_ctrl_c, InMemoryMetrics, Orchestrator, SyntheticIdentityProvider,
//! };
//! use chat_loadtest::testing::ScriptedTransport;
//! use loadtest_core::LoadTestConfig;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LoadTestConfig::from_file("scenario.yaml")?;
//! let shutdown = CancellationToken::new();
//! shutdown_on_ctrl_c(shutdown.clone());
//!
//! let metrics = Arc::new(InMemoryMetrics::new());
//! let orchestrator = Orchestrator::new(
//!     config,
//!     Arc::new(SyntheticIdentityProvider::new()),
//!     Arc::new(ScriptedTransport::succeeding()),
//!     metrics.clone(),
//! );
//!
//! let summary = orchestrator.run_until_cancelled(shutdown).await?;
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod bootstrap;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod routing;
pub mod testing;
pub mod transport;

pub use actor::{ActorDisposition, ActorPhase, ActorPlan, ActorReport, ActorSimulator, ActorState};
pub use bootstrap::{IdentityProvider, StaticIdentityProvider, SyntheticIdentityProvider};
pub use error::{ActorError, LoadTestError};
pub use metrics::{InMemoryMetrics, MetricsSink, MetricsSnapshot, NoopMetrics};
pub use orchestrator::{
    shutdown_on_ctrl_c, FailurePolicy, Orchestrator, RunContext, RunCounters, RunPhase,
    RunSummary, StopReason,
};
pub use routing::{ModelRouter, PromptRule};
pub use transport::{ChatRequest, ChatResponse, ChatTransport, TransportError};
