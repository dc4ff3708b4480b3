use super::Store;
use wheredunno_core::message::NewMessage;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    Store::in_memory(10).await.unwrap()
}

#[tokio::test]
async fn test_insert_and_list_messages_in_order() {
    let store = test_store().await;
    let first = store
        .insert_message(&NewMessage::new("hello", "u1", "Ali"))
        .await
        .unwrap();
    let second = store
        .insert_message(&NewMessage::new("hai", "u2", "Siti"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
    assert!(second.created_at >= first.created_at);

    let all = store.list_messages().await.unwrap();
    assert_eq!(all, vec![first, second]);
    assert_eq!(store.message_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_recent_messages_keeps_newest_oldest_first() {
    let store = test_store().await;
    for i in 0..5 {
        store
            .insert_message(&NewMessage::new(format!("m{i}"), "u1", "Ali"))
            .await
            .unwrap();
    }
    let recent = store.recent_messages(3).await.unwrap();
    let texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["m2", "m3", "m4"]);
}

#[tokio::test]
async fn test_upsert_same_user_is_last_write_wins() {
    let store = test_store().await;
    store
        .upsert_whereabout(Some("u1"), "Ali", "library", "i'm going to the library")
        .await
        .unwrap();
    store
        .upsert_whereabout(Some("u1"), "Ali", "gym", "i'm at the gym")
        .await
        .unwrap();

    let all = store.recent_whereabouts(10).await.unwrap();
    assert_eq!(all.len(), 1);

    let fact = store.find_whereabout_by_name("ali").await.unwrap().unwrap();
    assert_eq!(fact.whereabout, "gym");
    assert_eq!(fact.raw_message, "i'm at the gym");
    assert_eq!(fact.user_id.as_deref(), Some("u1"));
    assert!(fact.updated_at.is_some());
}

#[tokio::test]
async fn test_upsert_without_user_id_keys_by_name() {
    let store = test_store().await;
    store
        .upsert_whereabout(None, "Guest", "mall", "nak pergi mall")
        .await
        .unwrap();
    store
        .upsert_whereabout(None, "Guest", "pasar", "nak pergi pasar")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store
        .upsert_whereabout(Some("u9"), "Guest", "office", "i'm at the office")
        .await
        .unwrap();

    // Name-keyed and id-keyed facts are distinct records.
    assert_eq!(store.recent_whereabouts(10).await.unwrap().len(), 2);
    let fact = store.find_whereabout_by_name("guest").await.unwrap().unwrap();
    assert_eq!(fact.whereabout, "office");
}

#[tokio::test]
async fn test_find_by_name_is_case_insensitive_substring() {
    let store = test_store().await;
    store
        .upsert_whereabout(Some("u1"), "Muhammad Ali", "library", "going to the library")
        .await
        .unwrap();

    let fact = store.find_whereabout_by_name("ALI").await.unwrap().unwrap();
    assert_eq!(fact.user_name, "Muhammad Ali");
    assert!(store
        .find_whereabout_by_name("  muhammad ")
        .await
        .unwrap()
        .is_some());
    assert!(store.find_whereabout_by_name("siti").await.unwrap().is_none());
    assert!(store.find_whereabout_by_name("   ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_name_prefers_most_recent_match() {
    let store = test_store().await;
    store
        .upsert_whereabout(Some("u1"), "Ali", "library", "going to the library")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store
        .upsert_whereabout(Some("u2"), "Alia", "cafe", "i'm at the cafe")
        .await
        .unwrap();

    let fact = store.find_whereabout_by_name("ali").await.unwrap().unwrap();
    assert_eq!(fact.user_name, "Alia");
}

#[tokio::test]
async fn test_find_by_name_only_scans_lookup_window() {
    let store = Store::in_memory(2).await.unwrap();
    store
        .upsert_whereabout(Some("old"), "Zulkifli", "kampung", "balik kampung")
        .await
        .unwrap();
    for (id, name) in [("u1", "Ali"), ("u2", "Siti")] {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .upsert_whereabout(Some(id), name, "office", "i'm at the office")
            .await
            .unwrap();
    }

    // Outside the two most recent rows, so unreachable.
    assert!(store
        .find_whereabout_by_name("zulkifli")
        .await
        .unwrap()
        .is_none());
    assert!(store.find_whereabout_by_name("siti").await.unwrap().is_some());
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 2);
}
