use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Identity used for the delayed whereabouts answers.
pub const WHEREABOUTS_ASSISTANT_ID: &str = "whereabouts-assistant";
/// Display name shown on delayed whereabouts answers.
pub const WHEREABOUTS_ASSISTANT_NAME: &str = "tung tung tung sahur";
/// Identity used for assistant answers and apologies.
pub const GEMINI_ASSISTANT_ID: &str = "gemini-assistant";
/// Display name shown on assistant answers.
pub const GEMINI_ASSISTANT_NAME: &str = "Gemini AI";
/// Identity used to echo the question put to the assistant.
pub const USER_QUERY_ID: &str = "user-query";
/// Display name shown on echoed assistant questions.
pub const USER_QUERY_NAME: &str = "You (to AI)";

/// Identities whose messages never trigger whereabouts detection.
pub const ASSISTANT_IDENTITIES: &[&str] =
    &[WHEREABOUTS_ASSISTANT_ID, GEMINI_ASSISTANT_ID, USER_QUERY_ID];

/// Whether `user_id` belongs to one of the assistant's own identities.
pub fn is_assistant_identity(user_id: &str) -> bool {
    ASSISTANT_IDENTITIES.contains(&user_id)
}

/// A message persisted in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub user_name: String,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// `HH:MM` in local time, as shown next to each message.
    pub fn time_label(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}

/// A message about to be appended. The channel assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub text: String,
    pub user_id: String,
    pub user_name: String,
}

impl NewMessage {
    pub fn new(text: impl Into<String>, user_id: &str, user_name: &str) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        }
    }

    /// A message sent by `identity`.
    pub fn from_identity(text: impl Into<String>, identity: &Identity) -> Self {
        Self::new(text, &identity.user_id, &identity.user_name)
    }
}

/// Who is sending messages from this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
}

impl Identity {
    /// Resolve an identity the way the sign-in collaborator reports it:
    /// display name first, then the local part of the email, then `Anonymous`.
    /// A missing user id means nobody is signed in.
    pub fn resolve(user_id: Option<&str>, display_name: Option<&str>, email: Option<&str>) -> Self {
        let Some(user_id) = user_id.filter(|id| !id.trim().is_empty()) else {
            return Self::anonymous();
        };
        let user_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                email
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Anonymous".to_string());
        Self {
            user_id: user_id.to_string(),
            user_name,
        }
    }

    /// The identity of an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            user_name: "Anonymous".to_string(),
        }
    }
}

/// Text produced by a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub metadata: MessageMetadata,
}

/// Metadata about how a response was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which provider produced this response.
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_display_name() {
        let id = Identity::resolve(Some("u1"), Some("Aisyah"), Some("aisyah@example.com"));
        assert_eq!(id.user_id, "u1");
        assert_eq!(id.user_name, "Aisyah");
    }

    #[test]
    fn test_resolve_falls_back_to_email_local_part() {
        let id = Identity::resolve(Some("u2"), None, Some("hafiz.r@example.com"));
        assert_eq!(id.user_name, "hafiz.r");
        let id = Identity::resolve(Some("u2"), Some("   "), Some("hafiz@example.com"));
        assert_eq!(id.user_name, "hafiz");
    }

    #[test]
    fn test_resolve_without_name_or_email() {
        let id = Identity::resolve(Some("u3"), None, None);
        assert_eq!(id.user_id, "u3");
        assert_eq!(id.user_name, "Anonymous");
    }

    #[test]
    fn test_resolve_without_user_is_anonymous() {
        assert_eq!(Identity::resolve(None, Some("Ali"), None), Identity::anonymous());
        assert_eq!(Identity::resolve(Some(""), None, None).user_id, "anonymous");
    }

    #[test]
    fn test_assistant_identities() {
        assert!(is_assistant_identity("whereabouts-assistant"));
        assert!(is_assistant_identity("gemini-assistant"));
        assert!(is_assistant_identity("user-query"));
        assert!(!is_assistant_identity("anonymous"));
    }
}
