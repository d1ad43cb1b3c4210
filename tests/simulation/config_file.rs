//! Runs driven by a YAML scenario file.

use crate::common::orchestrator;
use chat_loadtest::testing::ScriptedTransport;
use chat_loadtest::{InMemoryMetrics, SyntheticIdentityProvider};
use loadtest_core::LoadTestConfig;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const SCENARIO: &str = r#"
name: file-scenario
seed: 7
organizations:
  count: 2
  name_prefix: acme
users:
  per_org:
    min: 2
    max: 2
  name_prefix: tester
user_behavior:
  think_time:
    base_secs: 2.0
    variance_secs: 1.0
    distribution: exponential
    max_secs: 5.0
  questions_per_session:
    min: 3
    max: 3
limits:
  stagger_ms: 0
models:
  default_model: baseline-model
test_types:
  - name: streaming-long
    weight: 100
    question_strategy: hypothetical
    streaming_response: true
    model_targeting:
      slm_models: [small-a, small-b]
      medium_models: [medium-a]
"#;

#[tokio::test(start_paused = true)]
async fn test_run_from_yaml_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SCENARIO.as_bytes()).unwrap();

    let config = LoadTestConfig::from_file(file.path()).unwrap();
    assert_eq!(config.name, "file-scenario");

    let transport = Arc::new(ScriptedTransport::succeeding());
    let metrics = Arc::new(InMemoryMetrics::new());
    let summary = orchestrator(
        config,
        Arc::new(SyntheticIdentityProvider::new()),
        transport.clone(),
        metrics.clone(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.total_actors, 4);
    assert_eq!(summary.total_requests, 12);
    assert_eq!(summary.seed, 7);

    let requests = transport.requests();
    assert_eq!(requests.len(), 12);
    for request in &requests {
        assert!(request.stream);
        assert!(["small-a", "small-b", "medium-a"].contains(&request.model.as_str()));
    }

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.requests_total, 12);
    assert!(!snapshot.models.contains_key("baseline-model"));
}
