//! Broadcast hub implementation
//!
//! The hub bundles the sink registry and the bounded inbound queue behind
//! one explicitly constructed object, created once at process start and
//! shared by `Arc` with every component that needs it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::config::HubConfig;
use super::error::HubError;
use super::registry::SinkRegistry;
use super::sink::{Sink, SinkId};

/// Central broadcast hub
///
/// Accepts published messages onto a bounded FIFO and fans each one out to
/// every registered sink from a single sender loop, so every sink observes
/// messages in enqueue order.
pub struct BroadcastHub {
    /// Registered client sinks
    registry: SinkRegistry,

    /// Producer half of the inbound broadcast queue
    inbound_tx: mpsc::Sender<String>,

    /// Consumer half, handed to the sender loop exactly once
    inbound_rx: Mutex<Option<mpsc::Receiver<String>>>,

    /// Sink id allocator
    next_sink_id: AtomicU64,

    /// Configuration
    config: HubConfig,
}

impl BroadcastHub {
    /// Create a new hub with default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a new hub with custom configuration
    pub fn with_config(config: HubConfig) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity);

        Self {
            registry: SinkRegistry::new(),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            next_sink_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Register a new client sink
    ///
    /// Allocates an id, creates the client conduit, and adds the sink to
    /// the registry. The returned receiver is the client's end of the
    /// conduit; its connection handler drains it until termination.
    pub async fn register(&self) -> (SinkId, mpsc::Receiver<String>) {
        let id = SinkId::new(self.next_sink_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.config.sink_capacity);

        self.registry.add(Sink::new(id, tx)).await;
        tracing::info!(sink = %id, "Client registered");

        (id, rx)
    }

    /// Remove a sink from the registry
    ///
    /// Idempotent. Called by the liveness detector when the client's
    /// transport fails; this is the only removal path.
    pub async fn deregister(&self, id: SinkId) {
        self.registry.remove(id).await;
        tracing::info!(sink = %id, "Client deregistered");
    }

    /// Enqueue a message for broadcast
    ///
    /// Suspends while the inbound queue is at capacity; a successful return
    /// means enqueued, not delivered. Fails only if the queue has been torn
    /// down.
    pub async fn publish(&self, message: String) -> Result<(), HubError> {
        self.inbound_tx
            .send(message)
            .await
            .map_err(|_| HubError::Closed)
    }

    /// Number of currently registered sinks
    pub async fn sink_count(&self) -> usize {
        self.registry.sink_count().await
    }

    /// Spawn the sender loop
    ///
    /// The loop is the sole consumer of the inbound queue: it dequeues each
    /// message and delivers it to every sink present in the registry at
    /// fan-out time. It runs for the lifetime of the hub; calling this a
    /// second time fails rather than spawning a competing consumer.
    pub fn spawn_sender_loop(self: &Arc<Self>) -> Result<JoinHandle<()>, HubError> {
        let mut slot = match self.inbound_rx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let rx = slot.take().ok_or(HubError::SenderLoopAlreadyRunning)?;
        drop(slot);

        let hub = Arc::clone(self);
        Ok(tokio::spawn(async move {
            hub.sender_loop(rx).await;
        }))
    }

    async fn sender_loop(&self, mut inbound_rx: mpsc::Receiver<String>) {
        tracing::debug!("Sender loop started");

        while let Some(message) = inbound_rx.recv().await {
            let delivered = self.registry.fan_out(&message).await;
            tracing::debug!(delivered = delivered, "Broadcast fanned out");
        }

        // Unreachable while the hub is alive: the hub holds the producer half
        tracing::debug!("Inbound queue closed, sender loop exiting");
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;

    fn spawned_hub() -> Arc<BroadcastHub> {
        let hub = Arc::new(BroadcastHub::new());
        hub.spawn_sender_loop().unwrap();
        hub
    }

    #[tokio::test]
    async fn test_publish_reaches_registered_sink() {
        let hub = spawned_hub();
        let (_id, mut rx) = hub.register().await;

        hub.publish("hello".to_string()).await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_fan_out_exactly_once_per_sink() {
        let hub = spawned_hub();
        let (_a, mut rx_a) = hub.register().await;
        let (_b, mut rx_b) = hub.register().await;

        hub.publish("only-once".to_string()).await.unwrap();

        assert_eq!(rx_a.recv().await.as_deref(), Some("only-once"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("only-once"));
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_per_sink_delivery_order() {
        let hub = Arc::new(BroadcastHub::with_config(
            HubConfig::default().sink_capacity(16),
        ));
        hub.spawn_sender_loop().unwrap();
        let (_id, mut rx) = hub.register().await;

        for i in 0..10 {
            hub.publish(format!("message-{}", i)).await.unwrap();
        }

        for i in 0..10 {
            assert_eq!(rx.recv().await, Some(format!("message-{}", i)));
        }
    }

    #[tokio::test]
    async fn test_no_delivery_after_deregister() {
        let hub = spawned_hub();
        let (id_a, mut rx_a) = hub.register().await;
        let (_b, mut rx_b) = hub.register().await;

        hub.deregister(id_a).await;
        assert_eq!(hub.sink_count().await, 1);

        hub.publish("late".to_string()).await.unwrap();

        assert_eq!(rx_b.recv().await.as_deref(), Some("late"));
        // rx_a's sending half was dropped with the registry entry
        assert_eq!(rx_a.recv().await, None);
    }

    #[tokio::test]
    async fn test_publish_backpressure_when_queue_full() {
        // No sender loop: the queue fills to capacity and stays full
        let hub = Arc::new(BroadcastHub::with_config(
            HubConfig::default().inbound_capacity(2),
        ));

        hub.publish("one".to_string()).await.unwrap();
        hub.publish("two".to_string()).await.unwrap();

        let mut blocked = task::spawn(hub.publish("three".to_string()));
        assert_pending!(blocked.poll());

        // Draining the queue lets the suspended publisher through
        hub.spawn_sender_loop().unwrap();
        while !blocked.is_woken() {
            tokio::task::yield_now().await;
        }
        assert_ready!(blocked.poll()).unwrap();
    }

    #[tokio::test]
    async fn test_sender_loop_spawns_once() {
        let hub = Arc::new(BroadcastHub::new());

        assert!(hub.spawn_sender_loop().is_ok());
        assert_eq!(
            hub.spawn_sender_loop().err(),
            Some(HubError::SenderLoopAlreadyRunning)
        );
    }

    #[tokio::test]
    async fn test_concurrent_registration_and_broadcast() {
        // Conduits sized above the broadcast count so no fan-out pass can
        // suspend on a sink whose owner has stopped draining
        let hub = Arc::new(BroadcastHub::with_config(
            HubConfig::default().sink_capacity(16),
        ));
        hub.spawn_sender_loop().unwrap();
        let mut handles = Vec::new();

        for _ in 0..16 {
            let hub = Arc::clone(&hub);
            handles.push(tokio::spawn(async move {
                let (id, mut rx) = hub.register().await;
                // Drain anything broadcast while registered
                while rx.try_recv().is_ok() {}
                hub.deregister(id).await;
            }));
        }

        for i in 0..8 {
            let hub = Arc::clone(&hub);
            handles.push(tokio::spawn(async move {
                hub.publish(format!("storm-{}", i)).await.unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(hub.sink_count().await, 0);
    }
}
