//! HTTP/WebSocket surface
//!
//! Two endpoints, served from one fixed listening port:
//!
//! - `PUT /broadcast?message=<text>` — enqueue a broadcast. Suspends the
//!   caller while the inbound queue is full; replies 200 with an empty body
//!   once enqueued (enqueue is the only success signal).
//! - `GET /register` — WebSocket upgrade. The client immediately receives
//!   the welcome frame, then every subsequently broadcast message as an
//!   individual text frame, in enqueue order, until its connection fails.
//!
//! Each accepted client gets a task pair: the connection handler delivering
//! sink messages over the transport, and the liveness detector watching the
//! read side for failure.

pub mod config;
pub mod connection;
pub mod listener;
pub mod routes;

pub use config::ServerConfig;
pub use connection::WELCOME_MESSAGE;
pub use listener::BroadcastServer;
