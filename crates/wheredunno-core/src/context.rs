use serde::{Deserialize, Serialize};

/// A single entry in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl ContextEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Conversation context passed to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System instruction conditioning tone, language, and persona.
    pub system_prompt: String,
    /// Conversation history (oldest first).
    pub history: Vec<ContextEntry>,
    /// The current user message.
    pub current_message: String,
    /// Override the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A structured message for API-based providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl Context {
    /// Create a new context with just a current message and default system prompt.
    pub fn new(message: &str) -> Self {
        Self {
            system_prompt: default_system_prompt(),
            history: Vec::new(),
            current_message: message.to_string(),
            model: None,
        }
    }

    /// Flatten history and question into one prompt, for the single-turn
    /// fallback request:
    ///
    /// ```text
    /// Previous messages: user: hi
    /// model: hello
    ///
    /// User: where is Ali?
    ///
    /// AI:
    /// ```
    pub fn to_prompt_string(&self) -> String {
        let history = self
            .history
            .iter()
            .map(|entry| {
                let role = if entry.role == "assistant" {
                    "model"
                } else {
                    "user"
                };
                format!("{role}: {}", entry.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Previous messages: {history}\n\nUser: {}\n\nAI:",
            self.current_message
        )
    }

    /// Convert context to structured API messages.
    ///
    /// Returns `(system_prompt, messages)`. The system prompt is separated
    /// because Gemini requires it outside the contents array.
    pub fn to_api_messages(&self) -> (String, Vec<ApiMessage>) {
        let mut messages = Vec::with_capacity(self.history.len() + 1);

        for entry in &self.history {
            messages.push(ApiMessage {
                role: entry.role.clone(),
                content: entry.content.clone(),
            });
        }

        messages.push(ApiMessage {
            role: "user".to_string(),
            content: self.current_message.clone(),
        });

        (self.system_prompt.clone(), messages)
    }
}

/// Fallback persona when no prompt file is loaded.
fn default_system_prompt() -> String {
    "You are a helpful AI assistant in a chat application. \
     Your name is tung tung tung sahur. Be concise, friendly, and answer in Malay when asked about whereabouts."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_deserialize_without_model() {
        let json = r#"{"system_prompt":"test","history":[],"current_message":"hi"}"#;
        let ctx: Context = serde_json::from_str(json).unwrap();
        assert!(ctx.model.is_none());
    }

    #[test]
    fn test_to_api_messages_basic() {
        let ctx = Context::new("hello");
        let (system, messages) = ctx.to_api_messages();
        assert!(system.contains("tung tung tung sahur"));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hello");
    }

    #[test]
    fn test_to_api_messages_with_history() {
        let ctx = Context {
            system_prompt: "Be helpful.".into(),
            history: vec![ContextEntry::user("Hi"), ContextEntry::assistant("Hello!")],
            current_message: "How are you?".into(),
            model: None,
        };
        let (system, messages) = ctx.to_api_messages();
        assert_eq!(system, "Be helpful.");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].content, "How are you?");
    }

    #[test]
    fn test_to_prompt_string_flattens_history() {
        let ctx = Context {
            system_prompt: String::new(),
            history: vec![ContextEntry::user("hi"), ContextEntry::assistant("hello")],
            current_message: "where is Ali?".into(),
            model: None,
        };
        assert_eq!(
            ctx.to_prompt_string(),
            "Previous messages: user: hi\nmodel: hello\n\nUser: where is Ali?\n\nAI:"
        );
    }
}
