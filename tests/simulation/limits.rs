//! Request budget and empty runs.

use crate::common::{orchestrator, scenario_config, static_provider};
use chat_loadtest::testing::ScriptedTransport;
use chat_loadtest::{ActorDisposition, InMemoryMetrics, StaticIdentityProvider, StopReason};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_request_limit_stops_run_cleanly() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let mut config = scenario_config(1, 5);
    config.limits.max_requests = Some(4);

    let summary = orchestrator(
        config,
        static_provider(3),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(transport.calls(), 4);
    assert_eq!(summary.total_requests, 4);
    assert_eq!(summary.stop_reason, StopReason::RequestLimit);
    assert!(summary
        .actors
        .iter()
        .all(|a| a.disposition == ActorDisposition::Completed));
    assert!(!summary.run_failed);
}

#[tokio::test(start_paused = true)]
async fn test_no_identities_completes_empty() {
    let transport = Arc::new(ScriptedTransport::succeeding());

    let summary = orchestrator(
        scenario_config(1, 5),
        Arc::new(StaticIdentityProvider::new(Vec::new())),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.total_actors, 0);
    assert!(summary.actors.is_empty());
    assert!(!summary.run_failed);
    assert_eq!(summary.stop_reason, StopReason::Completed);
    assert_eq!(transport.calls(), 0);
}
