//! "Where is X?" detection.

use regex::Regex;
use std::sync::OnceLock;
use wheredunno_core::{fact::WhereaboutQuery, message::is_assistant_identity};

const QUERY_PATTERN: &str =
    r"(?i)\b(?:where is|where's|dimana|di mana|mana|kemana|ke mana) (?P<name>[a-z0-9\s]+)\??";

fn query_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| match Regex::new(QUERY_PATTERN) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!("query pattern does not compile: {e}");
            None
        }
    })
    .as_ref()
}

/// Detect a whereabouts question and the name it asks about.
///
/// Messages from the assistant's own identities never match. The name is
/// not checked against known users.
pub fn detect_query(text: Option<&str>, sender_id: &str) -> Option<WhereaboutQuery> {
    if is_assistant_identity(sender_id) {
        return None;
    }
    let text = text?;
    let name = query_regex()?.captures(text)?.name("name")?.as_str().trim();
    if name.is_empty() {
        return None;
    }
    Some(WhereaboutQuery {
        target_user: name.to_string(),
        questioner_id: sender_id.to_string(),
    })
}
