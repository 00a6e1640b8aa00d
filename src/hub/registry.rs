//! Sink registry implementation
//!
//! The concurrency-safe set of currently live sinks. Registration and
//! death-detection mutate it under the write lock; fan-out iterates it
//! under the read lock, so a fan-out pass never observes a partially
//! updated set.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::sink::{Sink, SinkId};

/// Registry of active client sinks
///
/// Thread-safe via `RwLock`. The sender loop takes the read lock for each
/// fan-out pass; concurrent add/remove calls block until the pass
/// completes.
pub struct SinkRegistry {
    sinks: RwLock<HashMap<SinkId, Sink>>,
}

impl SinkRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(HashMap::new()),
        }
    }

    /// Add a sink under the write lock
    ///
    /// Ids are allocated from a counter, so a duplicate insert indicates a
    /// caller bug; the new sink replaces the old one and a warning is
    /// logged.
    pub async fn add(&self, sink: Sink) {
        let id = sink.id();
        let mut sinks = self.sinks.write().await;

        if sinks.insert(id, sink).is_some() {
            tracing::warn!(sink = %id, "Replaced an already-registered sink");
        } else {
            tracing::debug!(sink = %id, total = sinks.len(), "Sink registered");
        }
    }

    /// Remove a sink under the write lock
    ///
    /// Idempotent: removing an absent id is a no-op.
    pub async fn remove(&self, id: SinkId) {
        let mut sinks = self.sinks.write().await;

        if sinks.remove(&id).is_some() {
            tracing::debug!(sink = %id, total = sinks.len(), "Sink removed");
        }
    }

    /// Deliver one message to every currently registered sink
    ///
    /// Holds the read lock for the duration of the pass and visits each
    /// sink in turn, suspending on a full conduit. A sink whose receiving
    /// half is gone is skipped; removing it is the liveness detector's
    /// responsibility, never done here. Returns the number of successful
    /// deliveries.
    pub async fn fan_out(&self, message: &str) -> usize {
        let sinks = self.sinks.read().await;
        let mut delivered = 0;

        for sink in sinks.values() {
            if sink.deliver(message.to_owned()).await {
                delivered += 1;
            } else {
                tracing::debug!(sink = %sink.id(), "Sink conduit closed, skipping");
            }
        }

        delivered
    }

    /// Number of currently registered sinks
    pub async fn sink_count(&self) -> usize {
        self.sinks.read().await.len()
    }

    /// Check whether a sink is currently registered
    pub async fn contains(&self, id: SinkId) -> bool {
        self.sinks.read().await.contains_key(&id)
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;

    fn sink(id: u64, capacity: usize) -> (Sink, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Sink::new(SinkId::new(id), tx), rx)
    }

    #[tokio::test]
    async fn test_add_remove() {
        let registry = SinkRegistry::new();
        let (s, _rx) = sink(1, 1);
        let id = s.id();

        registry.add(s).await;
        assert_eq!(registry.sink_count().await, 1);
        assert!(registry.contains(id).await);

        registry.remove(id).await;
        assert_eq!(registry.sink_count().await, 0);
        assert!(!registry.contains(id).await);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let registry = SinkRegistry::new();

        registry.remove(SinkId::new(42)).await;
        assert_eq!(registry.sink_count().await, 0);
    }

    #[tokio::test]
    async fn test_fan_out_delivers_to_all() {
        let registry = SinkRegistry::new();
        let (s1, mut rx1) = sink(1, 1);
        let (s2, mut rx2) = sink(2, 1);
        registry.add(s1).await;
        registry.add(s2).await;

        let delivered = registry.fan_out("hello").await;

        assert_eq!(delivered, 2);
        assert_eq!(rx1.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx2.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_fan_out_skips_closed_sink() {
        let registry = SinkRegistry::new();
        let (s1, rx1) = sink(1, 1);
        let (s2, mut rx2) = sink(2, 1);
        registry.add(s1).await;
        registry.add(s2).await;
        drop(rx1);

        let delivered = registry.fan_out("hello").await;

        // The dead sink stays registered; only delivery is skipped
        assert_eq!(delivered, 1);
        assert_eq!(registry.sink_count().await, 2);
        assert_eq!(rx2.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_fan_out_empty_registry() {
        let registry = SinkRegistry::new();

        assert_eq!(registry.fan_out("hello").await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_add_remove_and_fan_out() {
        let registry = Arc::new(SinkRegistry::new());
        let mut handles = Vec::new();

        for i in 0..32u64 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let (tx, mut rx) = mpsc::channel(64);
                let id = SinkId::new(i);
                registry.add(Sink::new(id, tx)).await;

                // Drain whatever fan-out passes deliver while registered
                tokio::task::yield_now().await;
                while rx.try_recv().is_ok() {}

                registry.remove(id).await;
            }));
        }

        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.fan_out("stress").await;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.sink_count().await, 0);
    }
}
