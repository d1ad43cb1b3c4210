//! Core types for the chat-loadtest simulation engine.
//!
//! This crate provides the building blocks shared by the question generator
//! and the actor runtime:
//!
//! - [`LoadTestConfig`] - YAML scenario configuration with defaults and validation
//! - [`RandomSource`] - Seeded, platform-stable random sampler
//! - [`ThinkTimeConfig`] - Clamped inter-request delay sampling
//! - [`Strategy`], [`Identity`], [`ChatMessage`], [`Outcome`] - Shared value types
//!
//! # Architecture
//!
//! ```text
//! loadtest-core (this crate)
//!    │
//!    ├─── loadtest-questions  (prompt synthesis, uses RandomSource + Strategy)
//!    │
//!    └─── chat-loadtest       (actors, orchestrator, metrics sinks)
//! ```
//!
//! # Example
//!
//! ```rust
//! use loadtest_core::{RandomSource, ThinkTimeConfig, ThinkTimeDistribution};
//!
//! let config = ThinkTimeConfig::new(5.0, 2.0, ThinkTimeDistribution::Uniform);
//! let mut rng = RandomSource::new(42);
//!
//! let delay = config.sample_secs(&mut rng);
//! assert!((3.0..=7.0).contains(&delay));
//! ```

pub mod config;
pub mod rng;
pub mod think_time;
pub mod types;

pub use config::{
    BehaviorConfig, ConfigError, LimitsConfig, LoadTestConfig, ModelTargetingConfig,
    ModelsConfig, OrganizationConfig, RangeConfig, TestTypeConfig, UserConfig,
};
pub use rng::{derive_seed, RandomSource};
pub use think_time::{
    ThinkTimeConfig, ThinkTimeDistribution, DEFAULT_MAX_THINK_SECS, DEFAULT_MIN_THINK_SECS,
};
pub use types::{ChatMessage, ErrorKind, Identity, Outcome, Role, Strategy};
