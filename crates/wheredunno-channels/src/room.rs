//! SQLite-backed room with live snapshot subscription.
//!
//! Appends go to the store first, then into an in-process snapshot that
//! subscribers watch. Other processes sharing the same database are picked up
//! by [`Room::poll`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wheredunno_core::{
    error::WhereError,
    message::{ChatMessage, NewMessage},
    traits::{MessageChannel, MessageStream},
};
use wheredunno_memory::Store;

/// The room's message log.
pub struct Room {
    store: Store,
    snapshot: watch::Sender<Vec<ChatMessage>>,
}

impl Room {
    /// Open the room, loading every stored message into the snapshot.
    pub async fn open(store: Store) -> Result<Self, WhereError> {
        let messages = store.list_messages().await?;
        info!("room opened with {} messages", messages.len());
        let (snapshot, _) = watch::channel(messages);
        Ok(Self { store, snapshot })
    }

    /// Reload from the store. Returns `true` if subscribers were notified.
    pub async fn refresh(&self) -> Result<bool, WhereError> {
        let fresh = self.store.list_messages().await?;
        Ok(self.snapshot.send_if_modified(|current| {
            if *current == fresh {
                false
            } else {
                *current = fresh;
                true
            }
        }))
    }

    /// Refresh on an interval until cancelled.
    pub async fn poll(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("room poller stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!("room refresh failed: {e}");
                    }
                }
            }
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.snapshot.receiver_count()
    }
}

#[async_trait]
impl MessageChannel for Room {
    fn name(&self) -> &str {
        "room"
    }

    async fn append(&self, message: NewMessage) -> Result<ChatMessage, WhereError> {
        let stored = self
            .store
            .insert_message(&message)
            .await
            .map_err(|e| WhereError::Channel(format!("append failed: {e}")))?;

        let pushed = stored.clone();
        self.snapshot.send_modify(move |messages| {
            if messages.iter().all(|m| m.id != pushed.id) {
                messages.push(pushed);
                // Concurrent appends can land out of order; stable sort keeps ties in insertion order.
                messages.sort_by_key(|m| m.created_at);
            }
        });
        Ok(stored)
    }

    async fn snapshot(&self) -> Result<Vec<ChatMessage>, WhereError> {
        Ok(self.snapshot.borrow().clone())
    }

    async fn subscribe(&self) -> Result<MessageStream, WhereError> {
        Ok(Box::pin(WatchStream::new(self.snapshot.subscribe())))
    }
}
