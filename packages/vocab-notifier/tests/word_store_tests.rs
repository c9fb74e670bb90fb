mod common;

use chrono::{TimeZone, Utc};

use common::{create_test_store, insert_used_words, insert_word, last_used_of};
use vocab_notifier::db::WordStore;

#[tokio::test]
async fn test_fetch_returns_unused_in_insertion_order() {
    let t = create_test_store().await;
    insert_word(&t.store, 2, "w2", "jump", "nhảy", &["I jump."]).await;
    insert_word(&t.store, 1, "w1", "run", "chạy", &["I run."]).await;
    insert_word(&t.store, 3, "w3", "swim", "bơi", &[]).await;
    insert_used_words(&t.store, 2).await;

    let words = t.store.fetch_unused_words(10).await.expect("fetch failed");

    let terms: Vec<&str> = words.iter().map(|w| w.term.as_str()).collect();
    assert_eq!(terms, vec!["run", "jump", "swim"]);
    assert!(words.iter().all(|w| w.last_used.is_none()));
    assert_eq!(words[0].meaning_vi, "chạy");
    assert_eq!(words[0].first_example(), Some("I run."));
    assert!(words[2].examples.is_empty());
}

#[tokio::test]
async fn test_fetch_respects_limit() {
    let t = create_test_store().await;
    for i in 0..5 {
        insert_word(&t.store, i, &format!("w{i}"), &format!("term{i}"), "nghĩa", &[]).await;
    }

    assert_eq!(t.store.fetch_unused_words(3).await.unwrap().len(), 3);
    assert_eq!(t.store.fetch_unused_words(5).await.unwrap().len(), 5);
    // Fewer than requested only when the pool runs out.
    assert_eq!(t.store.fetch_unused_words(8).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_fetch_on_empty_store() {
    let t = create_test_store().await;
    assert!(t.store.fetch_unused_words(10).await.unwrap().is_empty());
    assert_eq!(t.store.count_used_words().await.unwrap(), 0);
}

#[tokio::test]
async fn test_marked_words_are_never_fetched_again() {
    let t = create_test_store().await;
    insert_word(&t.store, 1, "w1", "run", "chạy", &[]).await;
    insert_word(&t.store, 2, "w2", "jump", "nhảy", &[]).await;

    let now = Utc.with_ymd_and_hms(2024, 3, 5, 1, 30, 0).unwrap();
    t.store.mark_used(&["w1".to_string()], now).await.unwrap();

    let words = t.store.fetch_unused_words(10).await.unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].id, "w2");
    assert!(last_used_of(&t.store, "w1").await.is_some());
    assert!(last_used_of(&t.store, "w2").await.is_none());
}

#[tokio::test]
async fn test_count_grows_by_previously_unused_ids_only() {
    let t = create_test_store().await;
    insert_used_words(&t.store, 3).await;
    insert_word(&t.store, 1, "w1", "run", "chạy", &[]).await;
    insert_word(&t.store, 2, "w2", "jump", "nhảy", &[]).await;
    let before = t.store.count_used_words().await.unwrap();
    assert_eq!(before, 3);

    let ids = vec![
        "w1".to_string(),
        "w2".to_string(),
        "used-0".to_string(),
        "missing".to_string(),
    ];
    let updated = t.store.mark_used(&ids, Utc::now()).await.unwrap();

    assert_eq!(updated, 2);
    assert_eq!(t.store.count_used_words().await.unwrap(), before + 2);
}

#[tokio::test]
async fn test_mark_used_keeps_first_timestamp() {
    let t = create_test_store().await;
    insert_word(&t.store, 1, "w1", "run", "chạy", &[]).await;

    let first = Utc.with_ymd_and_hms(2024, 3, 5, 1, 30, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 3, 6, 1, 30, 0).unwrap();
    assert_eq!(t.store.mark_used(&["w1".to_string()], first).await.unwrap(), 1);
    let stamped = last_used_of(&t.store, "w1").await;

    assert_eq!(t.store.mark_used(&["w1".to_string()], later).await.unwrap(), 0);
    assert_eq!(last_used_of(&t.store, "w1").await, stamped);
}

#[tokio::test]
async fn test_mark_used_with_no_ids_is_noop() {
    let t = create_test_store().await;
    insert_word(&t.store, 1, "w1", "run", "chạy", &[]).await;

    assert_eq!(t.store.mark_used(&[], Utc::now()).await.unwrap(), 0);
    assert_eq!(t.store.fetch_unused_words(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_schema_bootstrap_is_idempotent() {
    let t = create_test_store().await;
    insert_word(&t.store, 1, "w1", "run", "chạy", &[]).await;

    let reopened = vocab_notifier::db::SqliteWordStore::from_pool(t.store.pool().clone())
        .await
        .expect("second bootstrap failed");
    assert_eq!(reopened.fetch_unused_words(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_reads_plain_string_examples() {
    let t = create_test_store().await;
    insert_word(&t.store, 2, "w2", "jump", "nhảy", &["I jump."]).await;
    sqlx::query(
        r#"
        INSERT INTO "words" ("id", "term", "meaningVi", "examples", "createdAt")
        VALUES ('w1', 'run', 'chạy', '["I run."]', '2024-01-01 00:00:01')
        "#,
    )
    .execute(t.store.pool())
    .await
    .expect("failed to insert word");

    let words = t.store.fetch_unused_words(10).await.expect("fetch failed");

    assert_eq!(words.len(), 2);
    assert_eq!(words[0].first_example(), Some("I run."));
    assert_eq!(words[1].first_example(), Some("I jump."));
}

#[tokio::test]
async fn test_mark_used_beyond_sqlite_variable_limit() {
    let t = create_test_store().await;
    for i in 0..3 {
        insert_word(&t.store, i, &format!("w{i}"), &format!("term{i}"), "nghĩa", &[]).await;
    }

    let mut ids: Vec<String> = (0..40_000).map(|i| format!("missing-{i}")).collect();
    ids.extend((0..3).map(|i| format!("w{i}")));

    let updated = t.store.mark_used(&ids, Utc::now()).await.expect("mark failed");

    assert_eq!(updated, 3);
    assert!(t.store.fetch_unused_words(10).await.unwrap().is_empty());
}
