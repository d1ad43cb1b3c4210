//! Shutdown, deadline and stagger behavior.

use crate::common::{init_tracing, orchestrator, scenario_config, static_provider};
use chat_loadtest::testing::ScriptedTransport;
use chat_loadtest::{ActorDisposition, InMemoryMetrics, LoadTestError, RunPhase, StopReason};
use loadtest_core::{ThinkTimeConfig, ThinkTimeDistribution};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn long_think_config(questions: u64) -> loadtest_core::LoadTestConfig {
    let mut config = scenario_config(1, questions);
    config.user_behavior.think_time =
        ThinkTimeConfig::new(10.0, 0.0, ThinkTimeDistribution::Uniform);
    config
}

#[tokio::test]
async fn test_shutdown_interrupts_think_time() {
    init_tracing();

    let transport = Arc::new(ScriptedTransport::succeeding());
    let metrics = Arc::new(InMemoryMetrics::new());
    let shutdown = CancellationToken::new();

    let mut config = long_think_config(5);
    config.limits.stagger_ms = 0;
    let run = tokio::spawn(
        orchestrator(config, static_provider(1), transport.clone(), metrics.clone())
            .run_until_cancelled(shutdown.clone()),
    );

    // Wait until the actor has sent its first question and is thinking.
    while transport.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    let canceled_at = Instant::now();
    shutdown.cancel();
    let result = run.await.unwrap();
    let elapsed = canceled_at.elapsed();

    assert!(elapsed < Duration::from_millis(50), "took {elapsed:?}");
    assert_eq!(transport.calls(), 1);

    // A canceled actor counts as erroring, so a single-actor run fails.
    let err = result.unwrap_err();
    let summary = err.summary().unwrap();
    assert_eq!(summary.stop_reason, StopReason::Shutdown);
    assert_eq!(summary.canceled_actors, 1);
    assert_eq!(summary.failed_actors, 1);
    assert_eq!(summary.actors[0].questions_completed, 1);
    assert_eq!(metrics.phase(), RunPhase::Error);
}

#[tokio::test(start_paused = true)]
async fn test_max_duration_cancels_actors() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let mut config = long_think_config(5);
    config.limits.max_duration_secs = Some(25);
    config.limits.stagger_ms = 0;

    let started = Instant::now();
    let err = orchestrator(
        config,
        static_provider(2),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap_err();

    // Requests at t=0, 10 and 20; the deadline lands in the third think.
    assert!(started.elapsed() < Duration::from_secs(26));
    assert_eq!(transport.calls(), 6);

    match err {
        LoadTestError::MajorityFailed(summary) => {
            assert_eq!(summary.stop_reason, StopReason::MaxDuration);
            assert_eq!(summary.canceled_actors, 2);
            assert_eq!(summary.failed_actors, 2);
            assert!(summary
                .actors
                .iter()
                .all(|a| a.questions_completed == 3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unstarted_actors_recorded_as_canceled() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let shutdown = CancellationToken::new();
    let mut config = long_think_config(5);
    config.limits.stagger_ms = 1_000;

    let canceler = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            shutdown.cancel();
        })
    };

    let err = orchestrator(
        config,
        static_provider(3),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run_until_cancelled(shutdown)
    .await
    .unwrap_err();
    canceler.await.unwrap();

    let summary = err.summary().unwrap();
    assert_eq!(transport.calls(), 1);
    assert_eq!(summary.total_actors, 3);
    assert_eq!(summary.actors.len(), 3);
    assert_eq!(summary.canceled_actors, 3);
    assert_eq!(summary.failed_actors, 3);
    assert_eq!(summary.completed_actors, 0);
    assert_eq!(summary.actors[0].questions_completed, 1);
    assert!(summary.actors[1..]
        .iter()
        .all(|a| a.disposition == ActorDisposition::Canceled && a.questions_completed == 0));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_start_sends_nothing() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let err = orchestrator(
        scenario_config(1, 5),
        static_provider(4),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run_until_cancelled(shutdown)
    .await
    .unwrap_err();

    assert_eq!(transport.calls(), 0);
    let summary = err.summary().unwrap();
    assert_eq!(summary.canceled_actors, 4);
    assert_eq!(summary.stop_reason, StopReason::Shutdown);

    // The serialized failure count is the one the run verdict was based on.
    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(json["failed_actors"], 4);
    assert_eq!(json["completed_actors"], 0);
    assert_eq!(json["run_failed"], true);
}
