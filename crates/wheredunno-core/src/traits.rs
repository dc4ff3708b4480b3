use crate::{
    context::Context,
    error::WhereError,
    message::{ChatMessage, NewMessage, OutgoingMessage},
};
use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

/// Live sequence of full room snapshots, ascending by creation time.
///
/// The first item is the snapshot at subscription time. Dropping the stream
/// unsubscribes.
pub type MessageStream = Pin<Box<dyn Stream<Item = Vec<ChatMessage>> + Send>>;

/// Text-completion provider behind the assistant.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider requires an API key to function.
    fn requires_api_key(&self) -> bool;

    /// Send a conversation context to the provider and get a response.
    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, WhereError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// Message channel: the append-only, time-ordered room log.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Persist a message. The channel assigns id and creation time.
    async fn append(&self, message: NewMessage) -> Result<ChatMessage, WhereError>;

    /// The latest known snapshot of every message, oldest first.
    async fn snapshot(&self) -> Result<Vec<ChatMessage>, WhereError>;

    /// Subscribe to live snapshots.
    async fn subscribe(&self) -> Result<MessageStream, WhereError>;
}
