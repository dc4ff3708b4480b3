//! "Ask AI" and chat analysis.

use super::Gateway;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};
use wheredunno_core::{
    config::Prompts,
    context::{Context, ContextEntry},
    error::WhereError,
    message::{
        ChatMessage, NewMessage, GEMINI_ASSISTANT_ID, GEMINI_ASSISTANT_NAME, USER_QUERY_ID,
        USER_QUERY_NAME,
    },
    traits::MessageChannel,
};

/// Apology posted to the room from the second consecutive failure on.
pub const APOLOGY: &str = "I'm sorry, I'm having trouble connecting to the Gemini AI service right now. Please try again later.";

/// Per-message character cap for the brief analysis fallback.
const BRIEF_MESSAGE_CHARS: usize = 100;

/// How an `ask` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// The answer, already posted to the room.
    Answered(String),
    /// No answer. `attempt` is the consecutive failure count.
    Failed { attempt: u32, notice: String },
}

/// User-facing notice for the `attempt`-th consecutive failure.
pub fn failure_notice(attempt: u32) -> &'static str {
    match attempt {
        0 | 1 => "Failed to get response from Gemini. Please try again with a different question.",
        2 => "Still having trouble with Gemini. Try a shorter, simpler question.",
        _ => "Gemini API is currently experiencing issues. Please try again later.",
    }
}

/// Role of a room message in assistant history.
fn history_entry(message: &ChatMessage) -> ContextEntry {
    if message.user_id == GEMINI_ASSISTANT_ID {
        ContextEntry::assistant(message.text.clone())
    } else {
        ContextEntry::user(message.text.clone())
    }
}

/// `{user_name}: {text}` lines for analysis, optionally truncated per message.
fn transcript(messages: &[ChatMessage], max_chars: Option<usize>) -> String {
    messages
        .iter()
        .map(|m| match max_chars {
            Some(max) if m.text.chars().count() > max => {
                let cut: String = m.text.chars().take(max).collect();
                format!("{}: {cut}...", m.user_name)
            }
            _ => format!("{}: {}", m.user_name, m.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The last `n` messages of `messages`.
fn tail(messages: &[ChatMessage], n: usize) -> &[ChatMessage] {
    &messages[messages.len().saturating_sub(n)..]
}

impl Gateway {
    /// Put a question to the assistant on behalf of the room.
    ///
    /// The question is echoed as `user-query`. History is the room as it
    /// stood before the echo. Returns `None` for a blank question.
    pub async fn ask(&self, question: &str) -> Option<AskOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let history = match self.room.snapshot().await {
            Ok(messages) => tail(&messages, self.assistant_config.history_messages)
                .iter()
                .map(history_entry)
                .collect(),
            Err(e) => {
                warn!("assistant: history unavailable: {e}");
                Vec::new()
            }
        };

        if let Err(e) = self
            .room
            .append(NewMessage::new(question, USER_QUERY_ID, USER_QUERY_NAME))
            .await
        {
            warn!("assistant: failed to echo question: {e}");
        }

        let context = Context {
            system_prompt: self.prompts.system.clone(),
            history,
            current_message: question.to_string(),
            model: None,
        };

        let answer = match self.provider.complete(&context).await {
            Ok(response) if !response.text.trim().is_empty() => {
                info!(
                    "assistant: answered via {} in {}ms",
                    response.metadata.provider_used, response.metadata.processing_time_ms
                );
                Ok(response.text)
            }
            Ok(_) => Err(WhereError::Provider("empty response".to_string())),
            Err(e) => Err(e),
        };

        match answer {
            Ok(text) => {
                self.failures.store(0, Ordering::SeqCst);
                if let Err(e) = self
                    .room
                    .append(NewMessage::new(
                        text.clone(),
                        GEMINI_ASSISTANT_ID,
                        GEMINI_ASSISTANT_NAME,
                    ))
                    .await
                {
                    error!("assistant: failed to post answer: {e}");
                }
                Some(AskOutcome::Answered(text))
            }
            Err(e) => {
                let attempt = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                warn!("assistant: attempt {attempt} failed: {e}");
                if attempt >= 2 {
                    if let Err(e) = self
                        .room
                        .append(NewMessage::new(
                            APOLOGY,
                            GEMINI_ASSISTANT_ID,
                            GEMINI_ASSISTANT_NAME,
                        ))
                        .await
                    {
                        error!("assistant: failed to post apology: {e}");
                    }
                }
                Some(AskOutcome::Failed {
                    attempt,
                    notice: failure_notice(attempt).to_string(),
                })
            }
        }
    }

    /// Answer a question about the room's recent conversation.
    ///
    /// Nothing is posted to the room. If the full transcript fails, a
    /// shorter, truncated one is tried once.
    pub async fn analyze(&self, question: &str) -> Result<String, WhereError> {
        let messages = self.room.snapshot().await?;

        let full = transcript(tail(&messages, self.assistant_config.analyze_messages), None);
        let prompt = Prompts::render_analyze(&self.prompts.analyze, &full, question);
        match self.complete_flat(&prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => warn!("analyze: full transcript failed, retrying brief: {e}"),
        }

        let brief_count = self.assistant_config.history_messages;
        let brief = transcript(tail(&messages, brief_count), Some(BRIEF_MESSAGE_CHARS));
        let prompt = Prompts::render_analyze(&self.prompts.analyze_brief, &brief, question);
        self.complete_flat(&prompt).await
    }

    /// One-shot completion under the system prompt, no history.
    async fn complete_flat(&self, prompt: &str) -> Result<String, WhereError> {
        let context = Context {
            system_prompt: self.prompts.system.clone(),
            history: Vec::new(),
            current_message: prompt.to_string(),
            model: None,
        };
        let response = self.provider.complete(&context).await?;
        if response.text.trim().is_empty() {
            return Err(WhereError::Provider("empty response".to_string()));
        }
        Ok(response.text)
    }
}
