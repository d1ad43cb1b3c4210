//! Whole-run scenarios with always-succeeding and always-failing services.

use crate::common::{init_tracing, orchestrator, scenario_config, static_provider};
use chat_loadtest::testing::ScriptedTransport;
use chat_loadtest::{
    ActorDisposition, InMemoryMetrics, LoadTestError, RunPhase, StopReason,
    SyntheticIdentityProvider, TransportError,
};
use loadtest_core::{ErrorKind, Role};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_three_users_all_succeed() {
    init_tracing();

    let transport = Arc::new(ScriptedTransport::succeeding());
    let metrics = Arc::new(InMemoryMetrics::new());

    let summary = orchestrator(
        scenario_config(3, 5),
        Arc::new(SyntheticIdentityProvider::new()),
        transport.clone(),
        metrics.clone(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.total_actors, 3);
    assert_eq!(summary.completed_actors, 3);
    assert_eq!(summary.failed_actors, 0);
    assert_eq!(summary.canceled_actors, 0);
    assert_eq!(summary.total_requests, 15);
    assert_eq!(summary.stop_reason, StopReason::Completed);
    assert!(!summary.run_failed);
    assert_eq!(summary.seed, 42);

    assert_eq!(metrics.requests_total(), 15);
    assert_eq!(metrics.requests_failed(), 0);
    assert_eq!(transport.calls(), 15);
    assert!(summary
        .actors
        .iter()
        .all(|a| a.questions_completed == 5 && a.requests_succeeded == 5));

    assert_eq!(
        metrics.phase_history(),
        vec![
            RunPhase::Initializing,
            RunPhase::Bootstrapping,
            RunPhase::Running,
            RunPhase::Completing,
            RunPhase::Complete,
        ]
    );
    assert_eq!(metrics.active_actors(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_service_fails_run() {
    init_tracing();

    let transport = Arc::new(ScriptedTransport::failing(TransportError::HttpStatus {
        status: 503,
        message: "service unavailable".to_string(),
    }));
    let metrics = Arc::new(InMemoryMetrics::new());

    let err = orchestrator(
        scenario_config(3, 5),
        Arc::new(SyntheticIdentityProvider::new()),
        transport.clone(),
        metrics.clone(),
    )
    .run()
    .await
    .unwrap_err();

    let summary = match &err {
        LoadTestError::MajorityFailed(summary) => summary,
        other => panic!("unexpected error: {other}"),
    };
    assert!(summary.run_failed);
    assert_eq!(summary.failed_actors, 3);
    for actor in &summary.actors {
        assert_eq!(actor.questions_completed, 5);
        assert_eq!(actor.requests_succeeded, 0);
        assert_eq!(actor.disposition, ActorDisposition::Failed);
    }
    assert_eq!(transport.calls(), 15);
    assert_eq!(metrics.error_count(ErrorKind::HttpStatus), 15);
    assert_eq!(metrics.phase(), RunPhase::Error);
    assert!(err.to_string().contains("3 of 3"));
    assert!(err.summary().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_same_seed_replays_same_requests() {
    let run = || async {
        let transport = Arc::new(ScriptedTransport::succeeding());
        let mut config = scenario_config(1, 6);
        config.user_behavior.multi_turn_probability = 0.5;
        orchestrator(
            config,
            static_provider(2),
            transport.clone(),
            Arc::new(InMemoryMetrics::new()),
        )
        .run()
        .await
        .unwrap();
        transport
    };

    let first = run().await;
    let second = run().await;

    for id in ["user-1", "user-2"] {
        let a = first.requests_for(id);
        let b = second.requests_for(id);
        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
    }
    assert_ne!(first.requests_for("user-1"), first.requests_for("user-2"));
}

#[tokio::test(start_paused = true)]
async fn test_actor_requests_are_sequential() {
    let transport = Arc::new(
        ScriptedTransport::succeeding().with_delay(std::time::Duration::from_millis(750)),
    );

    orchestrator(
        scenario_config(1, 4),
        static_provider(5),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(transport.calls(), 20);
    assert!(!transport.overlap_detected());
}

#[tokio::test(start_paused = true)]
async fn test_multi_turn_history_alternates_roles() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let mut config = scenario_config(1, 5);
    config.user_behavior.multi_turn_probability = 1.0;

    orchestrator(
        config,
        static_provider(1),
        transport.clone(),
        Arc::new(InMemoryMetrics::new()),
    )
    .run()
    .await
    .unwrap();

    let requests = transport.requests_for("user-1");
    assert_eq!(requests.len(), 5);
    // Every request but the last continues the conversation.
    for (i, request) in requests.iter().take(4).enumerate() {
        assert_eq!(request.messages.len(), i * 2 + 1);
        for (idx, message) in request.messages.iter().enumerate() {
            let expected = if idx % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role, expected);
        }
    }
    assert_eq!(requests[4].messages.len(), 1);
}
