//! Process-local publish/subscribe broadcaster over WebSockets.
//!
//! Any number of long-lived WebSocket clients register to receive messages,
//! and any HTTP caller injects a message that is fanned out to every client
//! registered at that moment.
//!
//! The crate is split into two layers:
//!
//! - [`hub`] — the concurrent core: the sink registry, the bounded inbound
//!   queue, and the sender loop that fans each message out to every sink.
//! - [`server`] — the HTTP/WebSocket surface: `PUT /broadcast` to publish,
//!   `GET /register` to subscribe, plus the per-connection task pair that
//!   delivers messages and detects dead transports.
//!
//! # Example
//!
//! ```no_run
//! use fanout_rs::{BroadcastServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> fanout_rs::Result<()> {
//!     let config = ServerConfig::with_addr("127.0.0.1:8081".parse().unwrap());
//!     let server = BroadcastServer::new(config);
//!     server.run().await
//! }
//! ```

pub mod error;
pub mod hub;
pub mod server;

pub use error::{Error, Result};
pub use hub::{BroadcastHub, HubConfig};
pub use server::{BroadcastServer, ServerConfig};
