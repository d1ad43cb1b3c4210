//! Identity provider that always fails.

use crate::bootstrap::IdentityProvider;
use crate::orchestrator::RunContext;
use async_trait::async_trait;
use loadtest_core::Identity;

/// Provider whose `provision` always returns an error with the given message.
#[derive(Debug, Clone)]
pub struct FailingIdentityProvider {
    message: String,
}

impl FailingIdentityProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FailingIdentityProvider {
    async fn provision(&self, ctx: &RunContext) -> anyhow::Result<Vec<Identity>> {
        anyhow::bail!("{} (run {})", self.message, ctx.run_id)
    }
}
