//! Per-client sink types
//!
//! A sink is the outbound conduit for exactly one client: the registry
//! targets it during fan-out, and the paired connection handler drains it.

use tokio::sync::mpsc;

/// Opaque identifier for a registered sink
///
/// Allocated from a process-wide counter at registration time. The registry
/// keys on this id rather than on the channel itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

impl SinkId {
    /// Create a sink id from a raw counter value
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink-{}", self.0)
    }
}

/// A registered client's outbound conduit
///
/// Owned by the registry for fan-out targeting; the receiving half lives in
/// the client's connection handler.
#[derive(Debug, Clone)]
pub struct Sink {
    id: SinkId,
    conduit: mpsc::Sender<String>,
}

impl Sink {
    /// Create a sink around the sending half of a client conduit
    pub(crate) fn new(id: SinkId, conduit: mpsc::Sender<String>) -> Self {
        Self { id, conduit }
    }

    /// Get the sink's id
    pub fn id(&self) -> SinkId {
        self.id
    }

    /// Deliver one message to this sink's client
    ///
    /// Suspends while the conduit is full. Returns `false` if the receiving
    /// half is gone (the connection handler has terminated); the caller
    /// skips the sink rather than treating this as an error.
    pub(crate) async fn deliver(&self, message: String) -> bool {
        self.conduit.send(message).await.is_ok()
    }
}
