//! Delayed whereabouts answers.
//!
//! A "where is X?" with a known answer is parked for a grace period. If a
//! human mentions X in the room before it elapses, the assistant stays quiet.
//! Otherwise the stored answer is posted as `whereabouts-assistant`.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wheredunno_core::{
    message::{ChatMessage, NewMessage, WHEREABOUTS_ASSISTANT_ID, WHEREABOUTS_ASSISTANT_NAME},
    traits::MessageChannel,
};

/// A question waiting for its grace period to run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    /// Name span from the question.
    pub target_user: String,
    /// Prepared answer, posted if nobody beats the assistant to it.
    pub response_text: String,
    /// Creation time of the question message.
    pub asked_at: DateTime<Utc>,
    pub questioner_id: String,
}

/// What happened to a question once its grace period elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Someone mentioned the target first.
    Suppressed(PendingQuestion),
    /// The assistant posted the answer.
    Delivered(ChatMessage),
    /// The answer could not be appended. The question is gone either way.
    DeliveryFailed(PendingQuestion),
}

/// FIFO of pending questions, shared by the pipeline and the tick loop.
pub struct DelayedResponder {
    queue: Mutex<VecDeque<PendingQuestion>>,
    delay: Duration,
}

impl DelayedResponder {
    pub fn new(delay: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            delay,
        }
    }

    /// Park a question at the back of the queue.
    pub async fn enqueue(&self, question: PendingQuestion) {
        debug!(
            "responder: queued answer about {} (asked by {})",
            question.target_user, question.questioner_id
        );
        self.queue.lock().await.push_back(question);
    }

    /// Number of questions still waiting.
    pub async fn pending(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Decide every question whose grace period has elapsed at `now`.
    ///
    /// Entries are taken oldest first, stopping at the first one still
    /// waiting. Each taken entry is decided exactly once.
    pub async fn tick(&self, now: DateTime<Utc>, channel: &dyn MessageChannel) -> Vec<Outcome> {
        let due = self.take_due(now).await;
        if due.is_empty() {
            return Vec::new();
        }

        let messages = match channel.snapshot().await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    "responder: snapshot failed, dropping {} due question(s): {e}",
                    due.len()
                );
                return Vec::new();
            }
        };

        let mut outcomes = Vec::with_capacity(due.len());
        for question in due {
            if has_been_answered(&question, &messages) {
                info!(
                    "responder: {} was mentioned after the question, staying quiet",
                    question.target_user
                );
                outcomes.push(Outcome::Suppressed(question));
                continue;
            }

            let reply = NewMessage::new(
                question.response_text.clone(),
                WHEREABOUTS_ASSISTANT_ID,
                WHEREABOUTS_ASSISTANT_NAME,
            );
            match channel.append(reply).await {
                Ok(sent) => {
                    info!("responder: answered where {} is", question.target_user);
                    outcomes.push(Outcome::Delivered(sent));
                }
                Err(e) => {
                    warn!(
                        "responder: failed to post answer about {}: {e}",
                        question.target_user
                    );
                    outcomes.push(Outcome::DeliveryFailed(question));
                }
            }
        }
        outcomes
    }

    async fn take_due(&self, now: DateTime<Utc>) -> Vec<PendingQuestion> {
        let delay = chrono::Duration::from_std(self.delay).unwrap_or(chrono::Duration::MAX);
        let mut queue = self.queue.lock().await;
        let mut due = Vec::new();
        while let Some(head) = queue.front() {
            let elapsed = now.signed_duration_since(head.asked_at);
            if elapsed < delay {
                break;
            }
            if let Some(question) = queue.pop_front() {
                due.push(question);
            }
        }
        due
    }
}

/// Whether a human mentioned the target after the question was asked.
///
/// Only the assistant's own delayed answers are ignored.
pub fn has_been_answered(question: &PendingQuestion, messages: &[ChatMessage]) -> bool {
    let needle = question.target_user.to_lowercase();
    messages.iter().any(|m| {
        m.created_at > question.asked_at
            && m.user_id != WHEREABOUTS_ASSISTANT_ID
            && m.text.to_lowercase().contains(&needle)
    })
}

/// Run [`DelayedResponder::tick`] every `tick` until cancelled.
///
/// Questions still queued at cancellation are dropped.
pub async fn responder_loop(
    responder: Arc<DelayedResponder>,
    channel: Arc<dyn MessageChannel>,
    tick: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let dropped = responder.pending().await;
                if dropped > 0 {
                    info!("responder: stopping, dropping {dropped} pending question(s)");
                }
                break;
            }
            _ = ticker.tick() => {
                responder.tick(Utc::now(), channel.as_ref()).await;
            }
        }
    }
}
