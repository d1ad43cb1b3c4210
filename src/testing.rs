//! Test doubles for the simulation engine.
//!
//! These stand in for the external collaborators (chat service and identity
//! service) so the actor loop and orchestrator can be exercised in-process,
//! including under a paused tokio clock.

pub mod identity_provider;
pub mod scripted_transport;

pub use identity_provider::FailingIdentityProvider;
pub use scripted_transport::ScriptedTransport;
