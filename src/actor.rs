//! Per-user simulation loop.
//!
//! An [`ActorSimulator`] plays one provisioned identity through a session of
//! questions:
//!
//! ```text
//! NotStarted ─▶ GeneratingContent ─▶ AwaitingResponse ─▶ Thinking ─┐
//!                      ▲                                            │
//!                      └────────────────────────────────────────────┘
//!                                  ─▶ Completed | Failed | Canceled
//! ```
//!
//! The actor owns its random source and its question generator, so nothing
//! in the loop is shared with other actors except the transport, the metrics
//! sink and the run counters.

use crate::error::ActorError;
use crate::metrics::MetricsSink;
use crate::orchestrator::RunCounters;
use crate::routing::ModelRouter;
use crate::transport::{ChatRequest, ChatResponse, ChatTransport, TransportError};
use loadtest_core::{
    ChatMessage, ErrorKind, Identity, LoadTestConfig, Outcome, RandomSource, RangeConfig, Role,
    Strategy, ThinkTimeConfig,
};
use loadtest_questions::QuestionGenerator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorPhase {
    NotStarted,
    GeneratingContent,
    AwaitingResponse,
    Thinking,
    Completed,
    Failed,
    Canceled,
}

/// How an actor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorDisposition {
    Completed,
    Failed,
    Canceled,
}

impl ActorDisposition {
    /// Whether this actor counts against the run's failure policy.
    pub fn is_error(&self) -> bool {
        !matches!(self, ActorDisposition::Completed)
    }
}

/// What an actor did, produced when its task ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorReport {
    pub identity_id: String,
    pub disposition: ActorDisposition,
    pub questions_planned: u64,
    pub questions_completed: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub last_outcome: Option<Outcome>,
}

impl ActorReport {
    /// Report for an actor whose task never ran to completion.
    pub fn aborted(identity_id: impl Into<String>, disposition: ActorDisposition) -> Self {
        Self {
            identity_id: identity_id.into(),
            disposition,
            questions_planned: 0,
            questions_completed: 0,
            requests_succeeded: 0,
            requests_failed: 0,
            last_outcome: None,
        }
    }
}

/// Mutable per-actor state. Only the owning task touches it.
#[derive(Debug, Clone)]
pub struct ActorState {
    pub identity_id: String,
    pub seed: u64,
    pub conversation_history: Vec<ChatMessage>,
    pub questions_completed: u64,
    pub last_outcome: Option<Outcome>,
    pub phase: ActorPhase,
}

impl ActorState {
    fn new(identity_id: String, seed: u64) -> Self {
        Self {
            identity_id,
            seed,
            conversation_history: Vec::new(),
            questions_completed: 0,
            last_outcome: None,
            phase: ActorPhase::NotStarted,
        }
    }

    /// Start a new turn, either continuing the conversation or replacing it.
    fn push_question(&mut self, question: String, continue_conversation: bool) {
        if !continue_conversation {
            self.conversation_history.clear();
        }
        self.conversation_history.push(ChatMessage::user(question));
    }

    /// Close the current turn with the assistant's reply, or drop the
    /// unanswered question so the history keeps alternating.
    fn finish_turn(&mut self, reply: Option<&str>) {
        match reply {
            Some(content) if !content.is_empty() => {
                self.conversation_history.push(ChatMessage::assistant(content));
            }
            _ => {
                if matches!(
                    self.conversation_history.last(),
                    Some(ChatMessage {
                        role: Role::User,
                        ..
                    })
                ) {
                    self.conversation_history.pop();
                }
            }
        }
    }
}

/// A weighted request profile resolved from configuration.
#[derive(Debug, Clone)]
pub struct TestProfile {
    pub name: String,
    pub weight: u32,
    pub strategy: Strategy,
    pub router: ModelRouter,
    pub streaming: bool,
}

/// Behavior shared by every actor of a run, resolved once from config.
#[derive(Debug, Clone)]
pub struct ActorPlan {
    pub think_time: ThinkTimeConfig,
    pub questions_per_session: RangeConfig,
    pub multi_turn_probability: f64,
    pub actor_error_threshold: f64,
    pub non_streaming_ttft_ratio: f64,
    pub profiles: Vec<TestProfile>,
    fallback: TestProfile,
    weights: Vec<u32>,
}

impl ActorPlan {
    pub fn from_config(config: &LoadTestConfig) -> Self {
        let models = &config.models;
        let profiles: Vec<TestProfile> = config
            .test_types
            .iter()
            .map(|test_type| TestProfile {
                name: test_type.name.clone(),
                weight: test_type.weight,
                strategy: test_type.question_strategy,
                router: ModelRouter::from_targeting(
                    &test_type.model_targeting,
                    models.short_prompt_chars,
                    &models.default_model,
                ),
                streaming: test_type.streaming_response,
            })
            .collect();

        let fallback = TestProfile {
            name: "default".to_string(),
            weight: 0,
            strategy: Strategy::Mixed,
            router: ModelRouter::new(models.default_model.clone()),
            streaming: false,
        };

        let behavior = &config.user_behavior;
        Self {
            think_time: behavior.think_time.clone(),
            questions_per_session: behavior.questions_per_session,
            multi_turn_probability: behavior.multi_turn_probability,
            actor_error_threshold: behavior.actor_error_threshold,
            non_streaming_ttft_ratio: models.non_streaming_ttft_ratio,
            weights: profiles.iter().map(|p| p.weight).collect(),
            profiles,
            fallback,
        }
    }

    /// Weighted draw over the profiles; mixed/default when no weight is set.
    pub fn pick_profile(&self, rng: &mut RandomSource) -> &TestProfile {
        rng.weighted_index(&self.weights)
            .and_then(|idx| self.profiles.get(idx))
            .unwrap_or(&self.fallback)
    }
}

/// Simulates one user against the chat transport.
pub struct ActorSimulator {
    identity: Arc<Identity>,
    plan: Arc<ActorPlan>,
    transport: Arc<dyn ChatTransport>,
    metrics: Arc<dyn MetricsSink>,
    counters: Arc<RunCounters>,
    cancel: CancellationToken,
    rng: RandomSource,
    questions: QuestionGenerator,
    state: ActorState,
    requests_succeeded: u64,
    requests_failed: u64,
}

impl ActorSimulator {
    pub fn new(
        identity: Arc<Identity>,
        seed: u64,
        plan: Arc<ActorPlan>,
        transport: Arc<dyn ChatTransport>,
        metrics: Arc<dyn MetricsSink>,
        counters: Arc<RunCounters>,
        cancel: CancellationToken,
    ) -> Self {
        let mut rng = RandomSource::new(seed);
        let questions = QuestionGenerator::new(rng.next_u64());
        let state = ActorState::new(identity.identity_id.clone(), seed);

        Self {
            identity,
            plan,
            transport,
            metrics,
            counters,
            cancel,
            rng,
            questions,
            state,
            requests_succeeded: 0,
            requests_failed: 0,
        }
    }

    pub fn state(&self) -> &ActorState {
        &self.state
    }

    /// Run the whole session and report how it ended.
    pub async fn run(mut self) -> ActorReport {
        let planned = self.plan.questions_per_session.sample(&mut self.rng);

        info!(
            identity_id = %self.identity.identity_id,
            name = %self.identity.name,
            group = %self.identity.group_name,
            questions = planned,
            "Starting actor"
        );

        let result = self.run_session(planned).await;
        let disposition = self.disposition(&result);
        self.state.phase = match disposition {
            ActorDisposition::Completed => ActorPhase::Completed,
            ActorDisposition::Failed => ActorPhase::Failed,
            ActorDisposition::Canceled => ActorPhase::Canceled,
        };

        match &result {
            Ok(()) => info!(
                identity_id = %self.identity.identity_id,
                questions_completed = self.state.questions_completed,
                failed = self.requests_failed,
                disposition = ?disposition,
                "Actor finished"
            ),
            Err(e) => warn!(
                identity_id = %self.identity.identity_id,
                questions_completed = self.state.questions_completed,
                error = %e,
                "Actor stopped early"
            ),
        }

        ActorReport {
            identity_id: self.state.identity_id.clone(),
            disposition,
            questions_planned: planned,
            questions_completed: self.state.questions_completed,
            requests_succeeded: self.requests_succeeded,
            requests_failed: self.requests_failed,
            last_outcome: self.state.last_outcome.take(),
        }
    }

    async fn run_session(&mut self, planned: u64) -> Result<(), ActorError> {
        for i in 0..planned {
            if self.cancel.is_cancelled() {
                return Err(ActorError::Canceled);
            }
            if !self.counters.try_acquire_request() {
                debug!(identity_id = %self.identity.identity_id, "Request budget exhausted");
                return Ok(());
            }

            let is_last = i + 1 == planned;
            self.ask(is_last).await?;

            if !is_last {
                self.think().await?;
            }
        }
        Ok(())
    }

    /// One synthesize, request, observe step.
    async fn ask(&mut self, is_last: bool) -> Result<(), ActorError> {
        self.state.phase = ActorPhase::GeneratingContent;

        let plan = Arc::clone(&self.plan);
        let profile = plan.pick_profile(&mut self.rng);
        let question = self.questions.random_question(profile.strategy);
        let continue_conversation =
            !is_last && self.rng.chance(self.plan.multi_turn_probability);
        let model = profile.router.select(&question, &mut self.rng);
        self.state.push_question(question, continue_conversation);

        let request = ChatRequest {
            model: model.clone(),
            messages: self.state.conversation_history.clone(),
            stream: profile.streaming,
        };

        self.state.phase = ActorPhase::AwaitingResponse;
        let started = Instant::now();
        let result = self.transport.send(&self.identity, request).await;
        let latency = started.elapsed();
        self.state.questions_completed += 1;

        match result {
            Ok(response) => {
                self.record_success(&model, latency, &response);
                self.state.finish_turn(Some(&response.content));
                Ok(())
            }
            Err(err) => {
                self.record_failure(&model, latency, &err);
                self.state.finish_turn(None);
                if err.is_fatal() {
                    Err(ActorError::Fatal(err))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn record_success(&mut self, model: &str, latency: Duration, response: &ChatResponse) {
        self.requests_succeeded += 1;

        let ttft = response
            .time_to_first_token
            .unwrap_or_else(|| latency.mul_f64(self.plan.non_streaming_ttft_ratio));
        let tps = response.tokens_per_second.unwrap_or_else(|| {
            let secs = latency.as_secs_f64();
            if secs > 0.0 {
                response.completion_tokens as f64 / secs
            } else {
                0.0
            }
        });

        let outcome = Outcome::success(latency, response.total_tokens()).with_timing(ttft, tps);
        self.metrics.record_request_outcome(
            &self.identity,
            model,
            latency,
            outcome.tokens_consumed,
            true,
            None,
        );
        if !ttft.is_zero() && tps > 0.0 {
            self.metrics.record_llm_timing(&self.identity, model, ttft, tps);
        }

        debug!(
            identity_id = %self.identity.identity_id,
            model,
            latency_ms = latency.as_millis() as u64,
            tokens = outcome.tokens_consumed,
            "Request succeeded"
        );
        self.state.last_outcome = Some(outcome);
    }

    fn record_failure(&mut self, model: &str, latency: Duration, err: &TransportError) {
        self.requests_failed += 1;
        self.counters.record_failed_request();

        let kind = err.kind();
        self.metrics
            .record_request_outcome(&self.identity, model, latency, 0, false, Some(kind));

        warn!(
            identity_id = %self.identity.identity_id,
            model,
            error_kind = %kind,
            error = %err,
            "Request failed"
        );
        self.state.last_outcome = Some(Outcome::failure(latency, kind));
    }

    /// Sleep for a sampled think time. Returns early on cancellation, and
    /// also when the run's request budget runs out.
    async fn think(&mut self) -> Result<(), ActorError> {
        self.state.phase = ActorPhase::Thinking;
        let delay = self.plan.think_time.sample(&mut self.rng);
        debug!(
            identity_id = %self.identity.identity_id,
            delay_ms = delay.as_millis() as u64,
            "Think time"
        );

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ActorError::Canceled),
            _ = self.counters.budget_drained() => Ok(()),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    fn disposition(&self, result: &Result<(), ActorError>) -> ActorDisposition {
        match result {
            Err(ActorError::Canceled) => ActorDisposition::Canceled,
            Err(ActorError::Fatal(err)) => match err.kind() {
                ErrorKind::Canceled | ErrorKind::DeadlineExceeded => ActorDisposition::Canceled,
                _ => ActorDisposition::Failed,
            },
            Ok(()) => {
                let attempted = self.requests_succeeded + self.requests_failed;
                if attempted > 0
                    && self.requests_failed as f64 / attempted as f64
                        > self.plan.actor_error_threshold
                {
                    ActorDisposition::Failed
                } else {
                    ActorDisposition::Completed
                }
            }
        }
    }
}
