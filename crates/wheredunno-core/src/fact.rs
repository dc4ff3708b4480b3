use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last self-reported whereabout of a user, as extracted from a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereaboutFact {
    /// Subject's user id. Absent for name-only matches.
    pub user_id: Option<String>,
    /// Display name, the lookup key for "where is X?".
    pub user_name: String,
    /// Free-text place or activity.
    pub whereabout: String,
    /// The message the fact was extracted from.
    pub raw_message: String,
    /// Server-assigned time of the last write. `None` until stored.
    pub updated_at: Option<DateTime<Utc>>,
}

impl WhereaboutFact {
    /// Key the fact is stored under: user id when known, else the name.
    pub fn key(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.user_name)
    }
}

/// A detected "where is X?" question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereaboutQuery {
    /// Name span the question concerns, trimmed.
    pub target_user: String,
    /// Who asked.
    pub questioner_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefers_user_id() {
        let mut fact = WhereaboutFact {
            user_id: Some("u1".into()),
            user_name: "Ali".into(),
            whereabout: "library".into(),
            raw_message: "i'm going to the library".into(),
            updated_at: None,
        };
        assert_eq!(fact.key(), "u1");
        fact.user_id = None;
        assert_eq!(fact.key(), "Ali");
    }
}
