//! In-process chat transport with scripted replies.

use crate::transport::{ChatRequest, ChatResponse, ChatTransport, TransportError};
use async_trait::async_trait;
use loadtest_core::{Identity, Role};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Completion tokens reported for every scripted reply.
const REPLY_TOKENS: u64 = 32;

#[derive(Debug, Clone)]
enum Script {
    Succeed,
    Fail(TransportError),
    /// Even-numbered calls succeed, odd-numbered calls fail.
    Alternate(TransportError),
    /// Fail only for the listed identity ids.
    FailFor(HashSet<String>, TransportError),
}

/// Transport that answers from a script instead of the network.
///
/// It also records every request and flags any identity that has two
/// requests in flight at once.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Script,
    delay: Option<Duration>,
    calls: AtomicU64,
    overlap_detected: AtomicBool,
    in_flight: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<(String, ChatRequest)>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicU64::new(0),
            overlap_detected: AtomicBool::new(false),
            in_flight: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request succeeds.
    pub fn succeeding() -> Self {
        Self::with_script(Script::Succeed)
    }

    /// Every request fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    /// First call succeeds, second fails with `error`, and so on.
    pub fn alternating(error: TransportError) -> Self {
        Self::with_script(Script::Alternate(error))
    }

    /// Requests from the listed identities fail with `error`; others succeed.
    pub fn failing_for<I, S>(identity_ids: I, error: TransportError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = identity_ids.into_iter().map(Into::into).collect();
        Self::with_script(Script::FailFor(ids, error))
    }

    /// Hold every request for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether any identity ever had two requests in flight.
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        locked(&self.requests).last().map(|(_, req)| req.clone())
    }

    /// Requests sent on behalf of `identity_id`, in order.
    pub fn requests_for(&self, identity_id: &str) -> Vec<ChatRequest> {
        locked(&self.requests)
            .iter()
            .filter(|(id, _)| id == identity_id)
            .map(|(_, req)| req.clone())
            .collect()
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        locked(&self.requests)
            .iter()
            .map(|(_, req)| req.clone())
            .collect()
    }

    fn outcome(&self, call: u64, identity: &Identity) -> Option<TransportError> {
        match &self.script {
            Script::Succeed => None,
            Script::Fail(error) => Some(error.clone()),
            Script::Alternate(error) => (call % 2 == 1).then(|| error.clone()),
            Script::FailFor(ids, error) => ids
                .contains(&identity.identity_id)
                .then(|| error.clone()),
        }
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        identity: &Identity,
        request: ChatRequest,
    ) -> Result<ChatResponse, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut in_flight = locked(&self.in_flight);
            let count = in_flight.entry(identity.identity_id.clone()).or_insert(0);
            if *count > 0 {
                self.overlap_detected.store(true, Ordering::SeqCst);
            }
            *count += 1;
        }

        let prompt_tokens = request
            .messages
            .iter()
            .map(|m| m.content.split_whitespace().count() as u64)
            .sum();
        let question = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        locked(&self.requests).push((identity.identity_id.clone(), request));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(count) = locked(&self.in_flight).get_mut(&identity.identity_id) {
            *count = count.saturating_sub(1);
        }

        match self.outcome(call, identity) {
            Some(error) => Err(error),
            None => Ok(ChatResponse::new(
                format!("Scripted answer to: {question}"),
                prompt_tokens,
                REPLY_TOKENS,
            )),
        }
    }
}
