//! Whereabout extraction.

use regex::Regex;
use std::sync::OnceLock;
use wheredunno_core::{fact::WhereaboutFact, message::ChatMessage};

/// Name recorded when the sender has no display name.
pub const UNKNOWN_SENDER_NAME: &str = "User";

/// Captured places that are connective words rather than places.
const SEPARATOR_WORDS: &[&str] = &["the", "a", "an", "to", "ke", "di"];

/// One entry of the ordered rule table. `pattern` must define a `place` group.
struct WhereaboutRule {
    name: &'static str,
    pattern: &'static str,
}

/// Ordered rules. The first rule whose capture survives filtering wins.
const WHEREABOUT_RULES: &[WhereaboutRule] = &[
    WhereaboutRule {
        name: "en_going_to",
        pattern: r"\b(?:i am|i'm|im|i will be|i'll be|aku|saya) (?:going|headed|heading|on my way) to (?:the )?(?P<place>[a-z0-9\s]+)",
    },
    WhereaboutRule {
        name: "en_at",
        pattern: r"\b(?:i am|i'm|im|i will be|i'll be|aku|saya) (?:at|in|visiting) (?:the )?(?P<place>[a-z0-9\s]+)",
    },
    WhereaboutRule {
        name: "en_want_to_go",
        pattern: r"\b(?:i want to|i wanna|i will|i'll|aku nak|saya mahu) (?:go|visit|head) to (?:the )?(?P<place>[a-z0-9\s]+)",
    },
    WhereaboutRule {
        name: "ms_pergi_ke",
        pattern: r"\b(?:pergi ke|ke|gi|pegi) (?P<place>[a-z0-9\s]+)",
    },
    WhereaboutRule {
        name: "ms_nak_pergi",
        pattern: r"\b(?:nak|mahu|hendak) (?:pergi|ke|gi) (?P<place>[a-z0-9\s]+)",
    },
];

struct CompiledRule {
    name: &'static str,
    regex: Regex,
}

fn compiled_rules() -> &'static [CompiledRule] {
    static RULES: OnceLock<Vec<CompiledRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        WHEREABOUT_RULES
            .iter()
            .filter_map(|rule| match Regex::new(&format!("(?i){}", rule.pattern)) {
                Ok(regex) => Some(CompiledRule {
                    name: rule.name,
                    regex,
                }),
                Err(e) => {
                    tracing::error!("whereabout rule {} does not compile: {e}", rule.name);
                    None
                }
            })
            .collect()
    })
}

/// Whether a trimmed capture is too short or a connective word.
fn is_rejected_place(place: &str) -> bool {
    place.chars().count() <= 2 || SEPARATOR_WORDS.contains(&place)
}

/// Apply the rule table to `text`, returning the winning rule name and place.
///
/// Matching runs on the lowercased text, so places come back lowercase.
pub fn match_whereabout(text: &str) -> Option<(&'static str, String)> {
    let lowered = text.to_lowercase();
    compiled_rules().iter().find_map(|rule| {
        let place = rule
            .regex
            .captures(&lowered)?
            .name("place")?
            .as_str()
            .trim();
        if is_rejected_place(place) {
            None
        } else {
            Some((rule.name, place.to_string()))
        }
    })
}

/// Extract an unsaved whereabout fact from a message's text and sender.
///
/// Missing or blank text is never a match.
pub fn detect_whereabout(
    text: Option<&str>,
    user_id: Option<&str>,
    user_name: Option<&str>,
) -> Option<WhereaboutFact> {
    let text = text.filter(|t| !t.trim().is_empty())?;
    let (_, place) = match_whereabout(text)?;
    Some(WhereaboutFact {
        user_id: user_id.filter(|id| !id.is_empty()).map(str::to_string),
        user_name: user_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNKNOWN_SENDER_NAME)
            .to_string(),
        whereabout: place,
        raw_message: text.to_string(),
        updated_at: None,
    })
}

/// [`detect_whereabout`] over a persisted message.
pub fn detect_whereabout_in(message: &ChatMessage) -> Option<WhereaboutFact> {
    detect_whereabout(
        Some(&message.text),
        Some(&message.user_id),
        Some(&message.user_name),
    )
}
