//! End-to-end simulation tests.
//!
//! These tests run the full orchestrator against in-process collaborators:
//! a scripted chat transport and synthetic or static identities. Most of
//! them run on a paused tokio clock so think times cost nothing.

mod bootstrap;
mod cancellation;
mod common;
mod config_file;
mod failure_policy;
mod limits;
mod scenarios;
