//! Inter-request delay sampling.
//!
//! A simulated user pauses between requests. The pause is drawn from one of
//! three distributions around a base value and then clamped into a hard
//! `[min, max]` window, so a misconfigured base or a long distribution tail
//! can never produce a negative or unbounded wait.

use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Lower clamp applied when `min` is not configured, in seconds.
pub const DEFAULT_MIN_THINK_SECS: f64 = 1.0;

/// Upper clamp applied when `max` is not configured, in seconds.
pub const DEFAULT_MAX_THINK_SECS: f64 = 60.0;

/// Shape of the think-time distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkTimeDistribution {
    /// Flat draw in `[base - variance, base + variance]`.
    #[default]
    Uniform,
    /// Normal draw with `mean = base` and `stddev = variance / 2`.
    #[serde(alias = "normal")]
    Gaussian,
    /// Exponential draw with `mean = base`. Variance is ignored.
    Exponential,
}

impl fmt::Display for ThinkTimeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThinkTimeDistribution::Uniform => write!(f, "uniform"),
            ThinkTimeDistribution::Gaussian => write!(f, "gaussian"),
            ThinkTimeDistribution::Exponential => write!(f, "exponential"),
        }
    }
}

impl FromStr for ThinkTimeDistribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(ThinkTimeDistribution::Uniform),
            "gaussian" | "normal" => Ok(ThinkTimeDistribution::Gaussian),
            "exponential" => Ok(ThinkTimeDistribution::Exponential),
            other => Err(format!(
                "Unknown think time distribution: {other}. Valid options: uniform, gaussian, exponential"
            )),
        }
    }
}

/// Think-time configuration, all values in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkTimeConfig {
    /// Centre of the distribution.
    #[serde(default = "default_base_secs")]
    pub base_secs: f64,

    /// Spread around the base (half-width for uniform, 2σ for gaussian).
    #[serde(default)]
    pub variance_secs: f64,

    #[serde(default)]
    pub distribution: ThinkTimeDistribution,

    /// Hard lower bound; defaults to one second.
    #[serde(default)]
    pub min_secs: Option<f64>,

    /// Hard upper bound; defaults to sixty seconds.
    #[serde(default)]
    pub max_secs: Option<f64>,
}

fn default_base_secs() -> f64 {
    5.0
}

impl Default for ThinkTimeConfig {
    fn default() -> Self {
        Self {
            base_secs: default_base_secs(),
            variance_secs: 0.0,
            distribution: ThinkTimeDistribution::default(),
            min_secs: None,
            max_secs: None,
        }
    }
}

impl ThinkTimeConfig {
    /// Create a config with the given base/variance/distribution and default
    /// clamps.
    pub fn new(base_secs: f64, variance_secs: f64, distribution: ThinkTimeDistribution) -> Self {
        Self {
            base_secs,
            variance_secs,
            distribution,
            min_secs: None,
            max_secs: None,
        }
    }

    /// Override the clamp window.
    pub fn with_bounds(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_secs = Some(min_secs);
        self.max_secs = Some(max_secs);
        self
    }

    /// Effective lower clamp in seconds.
    pub fn min(&self) -> f64 {
        self.min_secs.unwrap_or(DEFAULT_MIN_THINK_SECS)
    }

    /// Effective upper clamp in seconds.
    pub fn max(&self) -> f64 {
        self.max_secs.unwrap_or(DEFAULT_MAX_THINK_SECS)
    }

    /// Draw one think time in seconds, clamped into `[min, max]`.
    pub fn sample_secs(&self, rng: &mut RandomSource) -> f64 {
        let base = self.base_secs;
        let variance = self.variance_secs.max(0.0);

        let raw = match self.distribution {
            ThinkTimeDistribution::Uniform => rng.uniform(base - variance, base + variance),
            ThinkTimeDistribution::Gaussian => rng.normal(base, variance / 2.0),
            ThinkTimeDistribution::Exponential => {
                if base > 0.0 {
                    rng.exponential(base)
                } else {
                    0.0
                }
            }
        };

        let (min, max) = (self.min(), self.max());
        // NaN falls through max/min unchanged, so pin it to the floor first.
        let raw = if raw.is_nan() { min } else { raw };
        raw.max(min).min(max)
    }

    /// Draw one think time as a [`Duration`].
    pub fn sample(&self, rng: &mut RandomSource) -> Duration {
        Duration::try_from_secs_f64(self.sample_secs(rng)).unwrap_or(Duration::ZERO)
    }
}
