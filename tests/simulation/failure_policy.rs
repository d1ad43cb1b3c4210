//! Run-level majority failure policy.

use crate::common::{orchestrator, scenario_config, static_provider};
use chat_loadtest::testing::ScriptedTransport;
use chat_loadtest::{InMemoryMetrics, LoadTestError, RunPhase, TransportError};
use std::sync::Arc;

fn failing_ids(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("user-{n}")).collect()
}

fn server_error() -> TransportError {
    TransportError::HttpStatus {
        status: 500,
        message: "internal error".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_half_failing_run_passes() {
    let transport = Arc::new(ScriptedTransport::failing_for(failing_ids(2), server_error()));
    let metrics = Arc::new(InMemoryMetrics::new());

    let summary = orchestrator(
        scenario_config(1, 3),
        static_provider(4),
        transport,
        metrics.clone(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.total_actors, 4);
    assert_eq!(summary.failed_actors, 2);
    assert_eq!(summary.completed_actors, 2);
    assert_eq!(summary.failed_requests, 6);
    assert!(!summary.run_failed);
    assert_eq!(metrics.phase(), RunPhase::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_majority_failing_run_fails() {
    let transport = Arc::new(ScriptedTransport::failing_for(failing_ids(3), server_error()));

    let err = orchestrator(
        scenario_config(1, 3),
        static_provider(4),
        transport,
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap_err();

    match err {
        LoadTestError::MajorityFailed(summary) => {
            assert_eq!(summary.failed_actors, 3);
            assert_eq!(summary.completed_actors, 1);
            assert!(summary.run_failed);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_configured_ratio_applies() {
    let transport = Arc::new(ScriptedTransport::failing_for(failing_ids(1), server_error()));
    let mut config = scenario_config(1, 2);
    config.limits.majority_failure_ratio = 0.2;

    // 1 of 4 is above 20%.
    let err = orchestrator(
        config,
        static_provider(4),
        transport,
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap_err();
    assert_eq!(err.summary().map(|s| s.failed_actors), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_fatal_transport_error_ends_actor_early() {
    let transport = Arc::new(ScriptedTransport::failing_for(
        failing_ids(1),
        TransportError::DeadlineExceeded,
    ));

    let summary = orchestrator(
        scenario_config(1, 5),
        static_provider(3),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.failed_actors, 1);
    assert_eq!(summary.canceled_actors, 1);
    assert_eq!(summary.completed_actors, 2);
    assert_eq!(transport.requests_for("user-1").len(), 1);
    assert_eq!(transport.requests_for("user-2").len(), 5);
}
