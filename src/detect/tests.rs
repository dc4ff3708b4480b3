use super::*;

// --- Whereabouts ---

#[test]
fn test_english_going_to_strips_article() {
    let fact = detect_whereabout(Some("I'm going to the library"), Some("u1"), Some("Ali")).unwrap();
    assert_eq!(fact.whereabout, "library");
    assert_eq!(fact.user_id.as_deref(), Some("u1"));
    assert_eq!(fact.user_name, "Ali");
    assert_eq!(fact.raw_message, "I'm going to the library");
    assert!(fact.updated_at.is_none());
}

#[test]
fn test_english_surface_forms() {
    let cases = [
        ("i am heading to KLCC", "klcc"),
        ("I'll be on my way to the airport.", "airport"),
        ("im at the gym", "gym"),
        ("I will be in Penang tomorrow", "penang tomorrow"),
        ("I'm visiting grandma", "grandma"),
        ("I wanna go to the beach!", "beach"),
        ("i'll head to office", "office"),
    ];
    for (text, expected) in cases {
        let (_, place) = match_whereabout(text).unwrap_or_else(|| panic!("no match: {text}"));
        assert_eq!(place, expected, "text: {text}");
    }
}

#[test]
fn test_malay_surface_forms() {
    let cases = [
        ("Saya pergi ke pasar", "pasar"),
        ("aku nak pergi mall", "mall"),
        ("jom gi mamak", "mamak"),
        ("pegi kedai kejap", "kedai kejap"),
        ("hendak ke pejabat pos", "pejabat pos"),
        ("aku on my way to the stesen", "stesen"),
    ];
    for (text, expected) in cases {
        let (_, place) = match_whereabout(text).unwrap_or_else(|| panic!("no match: {text}"));
        assert_eq!(place, expected, "text: {text}");
    }
}

#[test]
fn test_first_matching_rule_wins() {
    // Matches both the "going to" and the Malay "ke" rules; the English rule is first.
    let (rule, place) = match_whereabout("I'm going to the cinema, lepas tu ke pasar").unwrap();
    assert_eq!(rule, "en_going_to");
    assert_eq!(place, "cinema");
}

#[test]
fn test_short_captures_are_rejected() {
    assert!(detect_whereabout(Some("I'm going to go"), None, Some("Ali")).is_none());
    assert!(detect_whereabout(Some("im in KL"), None, Some("Ali")).is_none());
    assert!(detect_whereabout(Some("I'm at  a "), None, Some("Ali")).is_none());
}

#[test]
fn test_separator_captures_are_rejected() {
    assert!(detect_whereabout(Some("I'm going to the"), None, Some("Ali")).is_none());
    assert!(match_whereabout("saya visiting the").is_none());
}

#[test]
fn test_rejected_capture_falls_through_to_later_rule() {
    // "at" captures "kl" (too short); the Malay "ke" rule still matches.
    let (rule, place) = match_whereabout("im at kl, nanti ke rumah").unwrap();
    assert_eq!(rule, "ms_pergi_ke");
    assert_eq!(place, "rumah");
}

#[test]
fn test_no_match_inside_words() {
    assert!(match_whereabout("I like pizza").is_none());
    assert!(match_whereabout("hello there").is_none());
}

#[test]
fn test_missing_or_blank_text_is_no_match() {
    assert!(detect_whereabout(None, Some("u1"), Some("Ali")).is_none());
    assert!(detect_whereabout(Some(""), Some("u1"), Some("Ali")).is_none());
    assert!(detect_whereabout(Some("   "), Some("u1"), Some("Ali")).is_none());
}

#[test]
fn test_missing_sender_name_defaults() {
    let fact = detect_whereabout(Some("I'm at the mosque"), None, None).unwrap();
    assert_eq!(fact.user_name, UNKNOWN_SENDER_NAME);
    assert!(fact.user_id.is_none());
}

#[test]
fn test_extraction_is_idempotent() {
    let text = "Saya pergi ke perpustakaan";
    let a = detect_whereabout(Some(text), Some("u1"), Some("Siti"));
    let b = detect_whereabout(Some(text), Some("u1"), Some("Siti"));
    assert!(a.is_some());
    assert_eq!(a, b);
}

#[test]
fn test_detect_in_message() {
    let msg = wheredunno_core::message::ChatMessage {
        id: "m1".into(),
        text: "I'm going to the library".into(),
        user_id: "u1".into(),
        user_name: "A".into(),
        created_at: chrono::Utc::now(),
    };
    let fact = detect_whereabout_in(&msg).unwrap();
    assert_eq!(fact.user_name, "A");
    assert_eq!(fact.whereabout, "library");
}

// --- Queries ---

#[test]
fn test_query_forms() {
    let cases = [
        ("where is Ali?", "Ali"),
        ("Where's Siti", "Siti"),
        ("dimana hafiz", "hafiz"),
        ("di mana Mei?", "Mei"),
        ("mana abu", "abu"),
        ("kemana dia pergi", "dia pergi"),
        ("ke mana   Zul  ?", "Zul"),
    ];
    for (text, expected) in cases {
        let q = detect_query(Some(text), "u2").unwrap_or_else(|| panic!("no match: {text}"));
        assert_eq!(q.target_user, expected, "text: {text}");
        assert_eq!(q.questioner_id, "u2");
    }
}

#[test]
fn test_query_no_match() {
    assert!(detect_query(Some("hello everyone"), "u2").is_none());
    assert!(detect_query(Some("where is ?"), "u2").is_none());
    assert!(detect_query(None, "u2").is_none());
}

#[test]
fn test_query_ignores_assistant_identities() {
    for id in ["whereabouts-assistant", "gemini-assistant", "user-query"] {
        assert!(detect_query(Some("where is Ali?"), id).is_none(), "{id}");
    }
}
