//! Identity provisioning failures and configuration errors.

use crate::common::{orchestrator, scenario_config};
use chat_loadtest::testing::{FailingIdentityProvider, ScriptedTransport};
use chat_loadtest::{InMemoryMetrics, LoadTestError, RunPhase};
use loadtest_core::{Strategy, TestTypeConfig};
use std::sync::Arc;

#[tokio::test]
async fn test_bootstrap_failure_aborts_run() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let metrics = Arc::new(InMemoryMetrics::new());

    let err = orchestrator(
        scenario_config(3, 5),
        Arc::new(FailingIdentityProvider::new("identity service unreachable")),
        transport.clone(),
        metrics.clone(),
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, LoadTestError::Bootstrap(_)));
    assert!(err.to_string().contains("identity service unreachable"));
    assert!(err.summary().is_none());
    assert_eq!(transport.calls(), 0);
    assert_eq!(
        metrics.phase_history(),
        vec![
            RunPhase::Initializing,
            RunPhase::Bootstrapping,
            RunPhase::Error
        ]
    );
}

#[tokio::test]
async fn test_invalid_config_rejected_before_bootstrap() {
    let transport = Arc::new(ScriptedTransport::succeeding());
    let metrics = Arc::new(InMemoryMetrics::new());
    let mut config = scenario_config(1, 1);
    config.test_types = vec![TestTypeConfig::new("only", 90, Strategy::Historical)];

    let err = orchestrator(
        config,
        Arc::new(FailingIdentityProvider::new("never called")),
        transport.clone(),
        metrics.clone(),
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, LoadTestError::Config(_)));
    assert_eq!(
        metrics.phase_history(),
        vec![RunPhase::Initializing, RunPhase::Error]
    );
    assert_eq!(transport.calls(), 0);
}
