//! Load test scenario configuration.
//!
//! Scenarios are described in YAML and parsed into [`LoadTestConfig`]. Every
//! section has defaults, so a minimal file only needs the fields it wants to
//! change. Parsing always runs [`LoadTestConfig::validate`], which means a
//! config obtained from [`LoadTestConfig::from_yaml`] or
//! [`LoadTestConfig::from_file`] is safe to hand to the engine.
//!
//! ```yaml
//! name: smoke
//! seed: 42
//! organizations:
//!   count: 1
//! users:
//!   per_org: { min: 3, max: 3 }
//! user_behavior:
//!   think_time:
//!     base_secs: 5
//!     variance_secs: 2
//!     distribution: gaussian
//!   questions_per_session: { min: 5, max: 5 }
//! test_types:
//!   - name: random_short
//!     weight: 100
//!     question_strategy: historical
//! ```

use crate::rng::RandomSource;
use crate::think_time::ThinkTimeConfig;
use crate::types::Strategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A field failed validation
    #[error("Invalid configuration: {field} {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: u64,
    pub max: u64,
}

impl RangeConfig {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range containing exactly one value.
    pub fn fixed(value: u64) -> Self {
        Self::new(value, value)
    }

    /// Draw a value in `[min, max]`.
    pub fn sample(&self, rng: &mut RandomSource) -> u64 {
        rng.range_inclusive(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationConfig {
    #[serde(default = "default_org_count")]
    pub count: u64,

    /// Prefix for generated organization names (`{prefix}-{n}`).
    #[serde(default)]
    pub name_prefix: Option<String>,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            count: default_org_count(),
            name_prefix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_users_per_org")]
    pub per_org: RangeConfig,

    /// Prefix for generated user names (`{prefix}-{n}`).
    #[serde(default)]
    pub name_prefix: Option<String>,

    #[serde(default = "default_api_keys_per_user")]
    pub api_keys_per_user: u64,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            per_org: default_users_per_org(),
            name_prefix: None,
            api_keys_per_user: default_api_keys_per_user(),
        }
    }
}

/// How each simulated user behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub think_time: ThinkTimeConfig,

    #[serde(default = "default_questions_per_session")]
    pub questions_per_session: RangeConfig,

    /// Probability (0.0-1.0) that a question continues the conversation.
    #[serde(default)]
    pub multi_turn_probability: f64,

    /// Fraction of failed requests above which an actor counts as failed.
    #[serde(default = "default_half")]
    pub actor_error_threshold: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            think_time: ThinkTimeConfig::default(),
            questions_per_session: default_questions_per_session(),
            multi_turn_probability: 0.0,
            actor_error_threshold: default_half(),
        }
    }
}

/// Run-wide stop conditions and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Cancel every actor after this many seconds.
    #[serde(default)]
    pub max_duration_secs: Option<u64>,

    /// Total requests the run may issue across all actors.
    #[serde(default)]
    pub max_requests: Option<u64>,

    /// The run fails when more than this fraction of actors report an error.
    #[serde(default = "default_half")]
    pub majority_failure_ratio: f64,

    /// Delay between consecutive actor starts.
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,

    /// Progress log interval; 0 disables the reporter.
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: None,
            max_requests: None,
            majority_failure_ratio: default_half(),
            stagger_ms: default_stagger_ms(),
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model used when no targeting rule matches.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Prompts shorter than this (in characters) route to small models.
    #[serde(default = "default_short_prompt_chars")]
    pub short_prompt_chars: usize,

    /// TTFT estimate for non-streamed replies, as a fraction of latency.
    #[serde(default = "default_half")]
    pub non_streaming_ttft_ratio: f64,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            short_prompt_chars: default_short_prompt_chars(),
            non_streaming_ttft_ratio: default_half(),
        }
    }
}

/// Candidate model pools for a test type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTargetingConfig {
    #[serde(default)]
    pub slm_models: Vec<String>,

    #[serde(default)]
    pub medium_models: Vec<String>,
}

/// A weighted request profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTypeConfig {
    pub name: String,

    /// Share of requests using this profile. Weights must sum to 100.
    pub weight: u32,

    #[serde(default)]
    pub question_strategy: Strategy,

    #[serde(default)]
    pub model_targeting: ModelTargetingConfig,

    #[serde(default)]
    pub streaming_response: bool,
}

impl TestTypeConfig {
    pub fn new(name: impl Into<String>, weight: u32, question_strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            weight,
            question_strategy,
            model_targeting: ModelTargetingConfig::default(),
            streaming_response: false,
        }
    }
}

/// Root configuration for a load test scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Base seed; derived from the start time when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub organizations: OrganizationConfig,

    #[serde(default)]
    pub users: UserConfig,

    #[serde(default)]
    pub user_behavior: BehaviorConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub test_types: Vec<TestTypeConfig>,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
            organizations: OrganizationConfig::default(),
            users: UserConfig::default(),
            user_behavior: BehaviorConfig::default(),
            limits: LimitsConfig::default(),
            models: ModelsConfig::default(),
            test_types: Vec::new(),
        }
    }
}

impl LoadTestConfig {
    /// Load and validate a config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: LoadTestConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and logical consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("name", "is required"));
        }

        if self.organizations.count < 1 {
            return Err(ConfigError::invalid("organizations.count", "must be >= 1"));
        }

        let per_org = self.users.per_org;
        if per_org.min < 1 {
            return Err(ConfigError::invalid("users.per_org.min", "must be >= 1"));
        }
        if per_org.max < per_org.min {
            return Err(ConfigError::invalid(
                "users.per_org.max",
                "must be >= users.per_org.min",
            ));
        }
        if self.users.api_keys_per_user < 1 {
            return Err(ConfigError::invalid(
                "users.api_keys_per_user",
                "must be >= 1",
            ));
        }

        let think = &self.user_behavior.think_time;
        if think.base_secs.is_nan() || think.base_secs < 0.0 {
            return Err(ConfigError::invalid(
                "user_behavior.think_time.base_secs",
                "must be >= 0",
            ));
        }
        if think.variance_secs.is_nan() || think.variance_secs < 0.0 {
            return Err(ConfigError::invalid(
                "user_behavior.think_time.variance_secs",
                "must be >= 0",
            ));
        }
        if think.min() < 0.0 {
            return Err(ConfigError::invalid(
                "user_behavior.think_time.min_secs",
                "must be >= 0",
            ));
        }
        if think.max() < think.min() {
            return Err(ConfigError::invalid(
                "user_behavior.think_time.max_secs",
                "must be >= min_secs",
            ));
        }

        let questions = self.user_behavior.questions_per_session;
        if questions.min < 1 {
            return Err(ConfigError::invalid(
                "user_behavior.questions_per_session.min",
                "must be >= 1",
            ));
        }
        if questions.max < questions.min {
            return Err(ConfigError::invalid(
                "user_behavior.questions_per_session.max",
                "must be >= questions_per_session.min",
            ));
        }

        check_fraction(
            "user_behavior.multi_turn_probability",
            self.user_behavior.multi_turn_probability,
        )?;
        check_fraction(
            "user_behavior.actor_error_threshold",
            self.user_behavior.actor_error_threshold,
        )?;
        check_fraction(
            "limits.majority_failure_ratio",
            self.limits.majority_failure_ratio,
        )?;
        check_fraction(
            "models.non_streaming_ttft_ratio",
            self.models.non_streaming_ttft_ratio,
        )?;

        if self.limits.max_duration_secs == Some(0) {
            return Err(ConfigError::invalid(
                "limits.max_duration_secs",
                "must be >= 1 when set",
            ));
        }

        if self.models.default_model.trim().is_empty() {
            return Err(ConfigError::invalid("models.default_model", "is required"));
        }

        if !self.test_types.is_empty() {
            for test_type in &self.test_types {
                if test_type.name.trim().is_empty() {
                    return Err(ConfigError::invalid("test_types.name", "is required"));
                }
            }
            let total: u64 = self.test_types.iter().map(|t| u64::from(t.weight)).sum();
            if total != 100 {
                return Err(ConfigError::invalid(
                    "test_types",
                    format!("weights must sum to 100, got {total}"),
                ));
            }
        }

        Ok(())
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be between 0 and 1"))
    }
}

fn default_name() -> String {
    "loadtest".to_string()
}

fn default_org_count() -> u64 {
    1
}

fn default_users_per_org() -> RangeConfig {
    RangeConfig::fixed(1)
}

fn default_api_keys_per_user() -> u64 {
    1
}

fn default_questions_per_session() -> RangeConfig {
    RangeConfig::new(3, 10)
}

fn default_half() -> f64 {
    0.5
}

fn default_stagger_ms() -> u64 {
    100
}

fn default_progress_interval_secs() -> u64 {
    10
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_short_prompt_chars() -> usize {
    100
}
