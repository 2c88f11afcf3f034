//! Voting orchestration against the store.
//!
//! Shared by the HTTP API and the scheduled worker. Pure rules live in
//! `agora-core`; this crate loads their inputs through the `agora-db`
//! repositories and persists the outcomes.

pub mod ballot;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod lifecycle;
pub mod options;
pub mod sweep;
pub mod tally;

pub use config::EngineConfig;
pub use error::EngineError;
