//! Identity provisioning.
//!
//! Before any actor starts, the orchestrator asks an [`IdentityProvider`] for
//! the simulated users of the run. Production deployments plug in a client
//! for their user/organization service; the providers here cover local runs
//! and tests.

use crate::orchestrator::RunContext;
use anyhow::Context;
use async_trait::async_trait;
use loadtest_core::{derive_seed, Identity, RandomSource};
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_ORG_PREFIX: &str = "loadtest-org";
const DEFAULT_USER_PREFIX: &str = "loadtest-user";
const DEFAULT_KEY_PREFIX: &str = "loadtest-key";

/// Supplies the identities a run simulates.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn provision(&self, ctx: &RunContext) -> anyhow::Result<Vec<Identity>>;
}

/// Derives organizations, users and API keys locally from the run config.
///
/// Organization names are `{prefix}-{n}`, or `loadtest-org-{run_id}-{n}`
/// when no prefix is configured. The users-per-org count is drawn from the
/// configured range with a source seeded from the run seed, so a replayed
/// run provisions the same shape. Each user gets `api_keys_per_user` keys;
/// the first one becomes the identity's credential.
#[derive(Debug, Clone, Default)]
pub struct SyntheticIdentityProvider;

impl SyntheticIdentityProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityProvider for SyntheticIdentityProvider {
    async fn provision(&self, ctx: &RunContext) -> anyhow::Result<Vec<Identity>> {
        let config = &ctx.config;
        let mut rng = RandomSource::new(derive_seed(ctx.seed, u64::MAX));
        let mut identities = Vec::new();

        info!(
            run_id = %ctx.run_id,
            org_count = config.organizations.count,
            "Provisioning synthetic identities"
        );

        for org_idx in 1..=config.organizations.count {
            let org_name = match &config.organizations.name_prefix {
                Some(prefix) => format!("{prefix}-{org_idx}"),
                None => format!("{DEFAULT_ORG_PREFIX}-{}-{org_idx}", ctx.run_id),
            };
            let org_id = Uuid::new_v4().to_string();
            let user_count = config.users.per_org.sample(&mut rng);

            for user_idx in 1..=user_count {
                let user_name = format!(
                    "{}-{user_idx}",
                    config
                        .users
                        .name_prefix
                        .as_deref()
                        .unwrap_or(DEFAULT_USER_PREFIX)
                );

                let keys: Vec<String> = (1..=config.users.api_keys_per_user)
                    .map(|key_idx| {
                        format!(
                            "sk-{DEFAULT_KEY_PREFIX}-{key_idx}-{}",
                            Uuid::new_v4().simple()
                        )
                    })
                    .collect();
                let credential = keys
                    .into_iter()
                    .next()
                    .with_context(|| format!("No API key created for user {user_name}"))?;

                debug!(org = %org_name, user = %user_name, "Provisioned identity");
                identities.push(Identity::new(
                    Uuid::new_v4().to_string(),
                    user_name,
                    credential,
                    org_id.clone(),
                    org_name.clone(),
                ));
            }
        }

        info!(identities = identities.len(), "Provisioning complete");
        Ok(identities)
    }
}

/// Returns a fixed list of identities.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identities: Vec<Identity>,
}

impl StaticIdentityProvider {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn provision(&self, _ctx: &RunContext) -> anyhow::Result<Vec<Identity>> {
        Ok(self.identities.clone())
    }
}
