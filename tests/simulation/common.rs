//! Shared fixtures for the simulation tests.

use chat_loadtest::testing::ScriptedTransport;
use chat_loadtest::{IdentityProvider, InMemoryMetrics, Orchestrator, StaticIdentityProvider};
use loadtest_core::{
    Identity, LoadTestConfig, RangeConfig, ThinkTimeConfig, ThinkTimeDistribution,
};
use std::sync::Arc;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("chat_loadtest=debug")
        .with_test_writer()
        .try_init()
        .ok();
}

/// One organization, `users` users, `questions` questions each, 1 s fixed
/// think time.
pub fn scenario_config(users: u64, questions: u64) -> LoadTestConfig {
    let mut config = LoadTestConfig::default();
    config.name = "simulation".to_string();
    config.seed = Some(42);
    config.organizations.count = 1;
    config.users.per_org = RangeConfig::fixed(users);
    config.user_behavior.questions_per_session = RangeConfig::fixed(questions);
    config.user_behavior.think_time =
        ThinkTimeConfig::new(1.0, 0.0, ThinkTimeDistribution::Uniform);
    config
}

pub fn identities(count: usize) -> Vec<Identity> {
    (1..=count)
        .map(|n| {
            Identity::new(
                format!("user-{n}"),
                format!("loadtest-user-{n}"),
                format!("sk-test-{n}"),
                "org-1",
                "loadtest-org-1",
            )
        })
        .collect()
}

pub fn static_provider(count: usize) -> Arc<dyn IdentityProvider> {
    Arc::new(StaticIdentityProvider::new(identities(count)))
}

pub fn orchestrator(
    config: LoadTestConfig,
    provider: Arc<dyn IdentityProvider>,
    transport: Arc<ScriptedTransport>,
    metrics: Arc<InMemoryMetrics>,
) -> Orchestrator {
    Orchestrator::new(config, provider, transport, metrics)
}
