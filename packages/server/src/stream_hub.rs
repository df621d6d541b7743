//! In-process pub/sub hub for per-job progress streaming.
//!
//! One bounded broadcast channel per job id. Producers (job runner tasks)
//! publish [`ProgressEvent`]s; consumers (SSE endpoints) subscribe by job id.
//! Channels are bounded: a slow subscriber lags and drops to the
//! oldest-unread event instead of stalling the publisher. Late subscribers
//! get no replay.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::jobs::ProgressEvent;

/// Thread-safe, cloneable fan-out hub keyed by job id.
#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<ProgressEvent>>>>,
    capacity: usize,
}

impl StreamHub {
    /// Create a hub with default capacity (256 events per job).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish an event to a job's topic. No-op if nobody is subscribed.
    pub async fn publish(&self, job_id: Uuid, event: ProgressEvent) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&job_id) {
            // Ignore send errors (no active receivers)
            let _ = tx.send(event);
        }
    }

    /// Subscribe to a job's topic. Creates the channel if it doesn't exist.
    pub async fn subscribe(&self, job_id: Uuid) -> broadcast::Receiver<ProgressEvent> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Remove channels with zero subscribers (housekeeping).
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(message: &str) -> ProgressEvent {
        ProgressEvent::from_update(
            Uuid::new_v4(),
            distiller::ProgressUpdate::stage_started(distiller::Stage::Outline),
        )
        .with_message(message)
    }

    #[tokio::test]
    async fn publish_subscribe_roundtrip() {
        let hub = StreamHub::new();
        let job_id = Uuid::new_v4();
        let mut rx = hub.subscribe(job_id).await;

        hub.publish(job_id, event("mapping structure")).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "mapping structure");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_noop() {
        let hub = StreamHub::new();
        // Should not panic
        hub.publish(Uuid::new_v4(), event("dropped")).await;
    }

    #[tokio::test]
    async fn subscribers_see_events_in_publish_order() {
        let hub = StreamHub::new();
        let job_id = Uuid::new_v4();
        let mut rx = hub.subscribe(job_id).await;

        for i in 0..5 {
            hub.publish(job_id, event(&format!("event {i}"))).await;
        }
        for i in 0..5 {
            assert_eq!(rx.recv().await.unwrap().message, format!("event {i}"));
        }
    }

    #[tokio::test]
    async fn cleanup_removes_empty_channels() {
        let hub = StreamHub::new();
        let job_id = Uuid::new_v4();
        let rx = hub.subscribe(job_id).await;

        assert_eq!(hub.channels.read().await.len(), 1);

        drop(rx);
        hub.cleanup().await;

        assert_eq!(hub.channels.read().await.len(), 0);
    }

    #[tokio::test]
    async fn topics_are_isolated_per_job() {
        let hub = StreamHub::new();
        let job_a = Uuid::new_v4();
        let job_b = Uuid::new_v4();
        let mut rx_a = hub.subscribe(job_a).await;
        let mut rx_b = hub.subscribe(job_b).await;

        hub.publish(job_a, event("for a")).await;
        hub.publish(job_b, event("for b")).await;

        assert_eq!(rx_a.recv().await.unwrap().message, "for a");
        assert_eq!(rx_b.recv().await.unwrap().message, "for b");
        assert!(rx_a.try_recv().is_err());
    }
}
