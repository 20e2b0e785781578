use feedsync::{Post, Strictness};

use super::support::*;

#[tokio::test]
async fn create_post_returns_materialized_entity() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;

    let post = client.create_post("u1", "Hello world", Vec::new()).await.expect("create post");
    assert!(!post.id.is_empty());
    assert_eq!(post.author_id, "u1");
    assert_eq!(post.content, "Hello world");
    assert!(post.likes.is_empty());
    assert!(post.comments.is_empty());
    assert_eq!(post.shares, 0);
    assert!(post.shared_post_id.is_none());
}

#[tokio::test]
async fn whitespace_content_never_reaches_the_store() {
    let store = CountingStore::new(MemoryStore::new());
    let client = FeedClient::new(store);

    for content in ["", "   ", "\n\t "] {
        let err = client.create_post("u1", content, Vec::new()).await.unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)), "content {content:?}");
    }
    assert_eq!(client.store().calls(), 0);
}

#[tokio::test]
async fn content_is_trimmed_on_create() {
    let client = client();
    let post = client.create_post("u1", "  hi there  ", Vec::new()).await.unwrap();
    assert_eq!(post.content, "hi there");
}

#[tokio::test]
async fn strict_mode_rejects_unparsable_image_urls() {
    let strict = client();
    let err = strict
        .create_post("u1", "look", vec!["not a url".to_string()])
        .await
        .unwrap_err();
    let FeedError::Validation(validation) = err else {
        panic!("expected validation error");
    };
    assert!(validation.issues.iter().any(|issue| issue.field == "images"));

    let relaxed = FeedClient::with_config(MemoryStore::new(), FeedConfig::relaxed());
    assert_eq!(relaxed.config().strictness, Strictness::Relaxed);
    relaxed
        .create_post("u1", "look", vec!["not a url".to_string()])
        .await
        .expect("relaxed mode skips URL validation");
}

#[tokio::test]
async fn delete_by_non_author_fails_and_post_remains() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    let post = client.create_post("u1", "mine", Vec::new()).await.unwrap();

    let err = client.delete_post("u2", &post.id).await.unwrap_err();
    assert!(matches!(err, FeedError::PermissionDenied { .. }));

    let still_there = client
        .store()
        .get(collections::POSTS, &post.id)
        .await
        .unwrap()
        .expect("post must remain retrievable");
    assert_eq!(still_there.id, post.id);
}

#[tokio::test]
async fn delete_by_author_is_hard_delete() {
    let client = client();
    let post = client.create_post("u1", "ephemeral", Vec::new()).await.unwrap();
    client.delete_post("u1", &post.id).await.expect("author delete");

    let err = client.delete_post("u1", &post.id).await.unwrap_err();
    assert!(matches!(err, FeedError::NotFound { .. }));
}

#[tokio::test]
async fn share_references_original_and_bumps_counter() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    let original = client.create_post("u1", "original", Vec::new()).await.unwrap();

    let share = client.share_post("u2", &original).await.expect("share");
    assert_eq!(share.author_id, "u2");
    assert_eq!(share.shared_post_id.as_deref(), Some(original.id.as_str()));
    assert!(share.content.contains("Alice"), "template names the original author");

    let stored: Post = client
        .store()
        .get(collections::POSTS, &original.id)
        .await
        .unwrap()
        .unwrap()
        .deserialize()
        .unwrap();
    assert_eq!(stored.shares, 1);
}

#[tokio::test]
async fn deleting_a_share_leaves_the_original_counter() {
    let client = client();
    let original = client.create_post("u1", "original", Vec::new()).await.unwrap();
    let share = client.share_post("u2", &original).await.unwrap();

    client.delete_post("u2", &share.id).await.unwrap();
    let stored: Post = client
        .store()
        .get(collections::POSTS, &original.id)
        .await
        .unwrap()
        .unwrap()
        .deserialize()
        .unwrap();
    assert_eq!(stored.shares, 1, "no compensating decrement on delete");
}

#[tokio::test]
async fn concurrent_shares_all_count() {
    const SHARERS: usize = 8;
    let client = Arc::new(client());
    let original = client.create_post("u1", "viral", Vec::new()).await.unwrap();

    let mut handles = Vec::with_capacity(SHARERS);
    for i in 0..SHARERS {
        let client = Arc::clone(&client);
        let original = original.clone();
        handles.push(tokio::spawn(async move {
            client.share_post(&format!("sharer-{i}"), &original).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("share succeeds");
    }

    let stored: Post = client
        .store()
        .get(collections::POSTS, &original.id)
        .await
        .unwrap()
        .unwrap()
        .deserialize()
        .unwrap();
    assert_eq!(stored.shares, SHARERS as i64);
}
