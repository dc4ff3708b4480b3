//! Gateway: connects the room, the whereabouts memory, and the provider.
//!
//! Owns the send path and the delayed responder loop, and shuts both down.

mod assistant;
mod pipeline;
mod responder;


pub use assistant::AskOutcome;
pub use pipeline::render_response;

use responder::DelayedResponder;

use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use wheredunno_core::{
    config::{AssistantConfig, Prompts, ResponderConfig},
    message::{ChatMessage, Identity, NewMessage},
    traits::{MessageChannel, Provider},
};
use wheredunno_memory::Store;

/// The central gateway between the room and the assistant.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) room: Arc<dyn MessageChannel>,
    pub(super) store: Store,
    pub(super) responder: Arc<DelayedResponder>,
    pub(super) prompts: Prompts,
    pub(super) assistant_config: AssistantConfig,
    pub(super) responder_config: ResponderConfig,
    /// Consecutive `ask` failures; reset on the first success.
    pub(super) failures: AtomicU32,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        provider: Arc<dyn Provider>,
        room: Arc<dyn MessageChannel>,
        store: Store,
        prompts: Prompts,
        assistant_config: AssistantConfig,
        responder_config: ResponderConfig,
    ) -> Self {
        let responder = Arc::new(DelayedResponder::new(Duration::from_millis(
            responder_config.delay_ms,
        )));
        Self {
            provider,
            room,
            store,
            responder,
            prompts,
            assistant_config,
            responder_config,
            failures: AtomicU32::new(0),
        }
    }

    /// Post `text` as `identity`, then run the whereabouts pipeline on it.
    ///
    /// Blank text is ignored. Only the append itself can fail.
    pub async fn send_message(
        &self,
        identity: &Identity,
        text: &str,
    ) -> anyhow::Result<Option<ChatMessage>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let sent = match self
            .room
            .append(NewMessage::from_identity(text, identity))
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                error!("send failed for {}: {e}", identity.user_id);
                anyhow::bail!("Failed to send message. Please try again.");
            }
        };

        self.track_whereabouts(&sent).await;
        Ok(Some(sent))
    }

    /// Spawn background loops. They stop when `cancel` fires.
    pub fn spawn_background(&self, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if self.responder_config.enabled {
            let tick = Duration::from_millis(self.responder_config.tick_ms.max(1));
            handles.push(tokio::spawn(responder::responder_loop(
                self.responder.clone(),
                self.room.clone(),
                tick,
                cancel,
            )));
            info!(
                "responder running | delay: {}ms | tick: {}ms",
                self.responder_config.delay_ms, self.responder_config.tick_ms
            );
        } else {
            info!("responder disabled");
        }
        handles
    }

    /// Stop background loops and close the store.
    pub async fn shutdown(&self, cancel: &CancellationToken, handles: Vec<JoinHandle<()>>) {
        info!("Shutting down...");
        cancel.cancel();
        for handle in handles {
            if let Err(e) = handle.await {
                error!("background task ended abnormally: {e}");
            }
        }
        self.store.close().await;
        info!("Shutdown complete.");
    }
}
