//! Broadcast hub: registry plus fan-out engine
//!
//! The hub owns the set of active client sinks and the single ordered
//! delivery pipeline. Publishers enqueue onto a bounded FIFO; one sender
//! loop drains it and fans each message out to every registered sink.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<BroadcastHub>
//!        ┌──────────────────────────────────────────┐
//!        │ inbound: mpsc::channel(99)               │
//!        │ registry: RwLock<HashMap<SinkId, Sink>>  │
//!        └──────────┬───────────────────────────────┘
//!                   │
//!   publish() ──► inbound queue ──► sender loop
//!                                       │
//!              ┌────────────────────────┼────────────────────────┐
//!              ▼                        ▼                        ▼
//!         [Sink 1]                 [Sink 2]                 [Sink 3]
//!         conduit.recv()           conduit.recv()           conduit.recv()
//!              │                        │                        │
//!              └──► connection handler ──► WebSocket text frame
//! ```
//!
//! # Ordering
//!
//! The inbound queue is strict FIFO with a single consumer, so each sink
//! observes messages in enqueue order. No ordering is guaranteed across two
//! different sinks in wall-clock time: fan-out visits sinks one at a time,
//! and a slow sink delays delivery to every sink visited after it within
//! the same pass.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod registry;
pub mod sink;

pub use broadcast::BroadcastHub;
pub use config::HubConfig;
pub use error::HubError;
pub use registry::SinkRegistry;
pub use sink::{Sink, SinkId};
