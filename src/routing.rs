//! Model selection for outgoing requests.
//!
//! Each test profile carries its own targeting: small models for short
//! prompts and medium models for longer ones. The router is an ordered table
//! of `(predicate, pool)` routes; the first route whose predicate matches the
//! prompt and whose pool is non-empty wins, and the configured default model
//! is used when nothing matches.

use loadtest_core::{ModelTargetingConfig, RandomSource};

/// Prompt predicate for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRule {
    /// Prompt length in characters is strictly below the threshold.
    ShorterThan(usize),
    /// Prompt length in characters is at or above the threshold.
    AtLeast(usize),
}

impl PromptRule {
    pub fn matches(&self, prompt: &str) -> bool {
        let len = prompt.chars().count();
        match *self {
            PromptRule::ShorterThan(limit) => len < limit,
            PromptRule::AtLeast(limit) => len >= limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoute {
    pub rule: PromptRule,
    pub pool: Vec<String>,
}

/// Ordered routing table with a baseline default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRouter {
    routes: Vec<ModelRoute>,
    default_model: String,
}

impl ModelRouter {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            default_model: default_model.into(),
        }
    }

    /// Append a route. Routes are evaluated in insertion order.
    pub fn with_route(mut self, rule: PromptRule, pool: Vec<String>) -> Self {
        self.routes.push(ModelRoute { rule, pool });
        self
    }

    /// Router for one test profile: short prompts to the small pool, the rest
    /// to the medium pool.
    pub fn from_targeting(
        targeting: &ModelTargetingConfig,
        short_prompt_chars: usize,
        default_model: &str,
    ) -> Self {
        Self::new(default_model)
            .with_route(
                PromptRule::ShorterThan(short_prompt_chars),
                targeting.slm_models.clone(),
            )
            .with_route(
                PromptRule::AtLeast(short_prompt_chars),
                targeting.medium_models.clone(),
            )
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Pick a model for `prompt`, uniformly within the matching pool.
    pub fn select(&self, prompt: &str, rng: &mut RandomSource) -> String {
        self.routes
            .iter()
            .filter(|route| !route.pool.is_empty() && route.rule.matches(prompt))
            .find_map(|route| rng.choose(&route.pool).cloned())
            .unwrap_or_else(|| self.default_model.clone())
    }
}
