//! Sync engine and session lifecycle.
//!
//! The engine is the state machine reacting to source events; the
//! session wires it to the initial scan and the live watcher.

mod engine;
mod session;

pub use engine::{EngineConfig, ReconcileReport, SyncEngine, SyncOutcome, SyncStats};
pub use session::SyncSession;
