//! tracker-notify Library
//!
//! Observes an interactive AI-agent session and derives task lifecycle
//! signals for an external tracker, plus a turn-complete notification:
//! - Event classification for the host runtime's event stream
//! - A per-session start/finish state machine with dedupe guards
//! - Fire-and-forget dispatch to the tracker client and notifier

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod logging;
pub mod probe;
pub mod summary;
