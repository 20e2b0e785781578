use feedsync::{NotificationKind, Post};

use super::support::*;

#[tokio::test]
async fn like_toggle_scenario_with_notifications() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    seed_user(&client, "u2", "Bob").await;

    let post = client.create_post("u1", "Hello world", Vec::new()).await.unwrap();
    assert!(post.likes.is_empty());
    assert!(post.comments.is_empty());
    assert_eq!(post.shares, 0);

    let outcome = client.toggle_like(&post.id, "u2").await.unwrap();
    assert!(outcome.liked);
    assert_eq!(outcome.like_count, 1);

    let notifications = client.unread_notifications("u1", 10).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Like);
    assert_eq!(notifications[0].user_id, "u1");
    assert_eq!(notifications[0].data.actor_id.as_deref(), Some("u2"));
    assert_eq!(notifications[0].data.post_id.as_deref(), Some(post.id.as_str()));

    let outcome = client.toggle_like(&post.id, "u2").await.unwrap();
    assert!(!outcome.liked);
    assert_eq!(outcome.like_count, 0);

    // unlike emits nothing new
    let notifications = client.unread_notifications("u1", 10).await.unwrap();
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn toggle_twice_restores_membership() {
    let client = client();
    let post = client.create_post("u1", "involution", Vec::new()).await.unwrap();

    client.toggle_like(&post.id, "u2").await.unwrap();
    client.toggle_like(&post.id, "u2").await.unwrap();

    let stored: Post = client
        .store()
        .get(collections::POSTS, &post.id)
        .await
        .unwrap()
        .unwrap()
        .deserialize()
        .unwrap();
    assert!(stored.likes.is_empty());
}

#[tokio::test]
async fn self_like_creates_no_notification() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    let post = client.create_post("u1", "own post", Vec::new()).await.unwrap();

    let outcome = client.toggle_like(&post.id, "u1").await.unwrap();
    assert!(outcome.liked);
    assert!(client.unread_notifications("u1", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_likes_from_distinct_users_all_land() {
    const LIKERS: usize = 6;
    let client = Arc::new(client());
    let post = client.create_post("u1", "popular", Vec::new()).await.unwrap();

    let mut handles = Vec::with_capacity(LIKERS);
    for i in 0..LIKERS {
        let client = Arc::clone(&client);
        let post_id = post.id.clone();
        handles.push(tokio::spawn(async move {
            client.toggle_like(&post_id, &format!("liker-{i}")).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().liked);
    }

    let stored: Post = client
        .store()
        .get(collections::POSTS, &post.id)
        .await
        .unwrap()
        .unwrap()
        .deserialize()
        .unwrap();
    assert_eq!(stored.likes.len(), LIKERS);
}

#[tokio::test]
async fn like_on_missing_post_is_not_found() {
    let client = client();
    let err = client.toggle_like("absent", "u2").await.unwrap_err();
    assert!(matches!(err, FeedError::NotFound { .. }));
}

#[tokio::test]
async fn comment_appears_in_feed_and_notifies_with_preview() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    seed_user(&client, "u2", "Bob").await;
    let post = client.create_post("u1", "comment on me", Vec::new()).await.unwrap();

    let long_comment = "привет ".repeat(20);
    let comment = client.add_comment(&post.id, "u2", &long_comment).await.unwrap();
    assert_eq!(comment.author_id, "u2");
    assert!(!comment.id.is_empty());

    let page = client.list_recent_posts(None, None).await.unwrap();
    let view = page
        .posts
        .iter()
        .find(|view| view.post.id == post.id)
        .expect("post in feed");
    assert_eq!(view.post.comments.len(), 1);
    assert_eq!(view.post.comments[0].content, comment.content);
    assert_eq!(view.post.comments[0].author_id, "u2");

    let notifications = client.unread_notifications("u1", 10).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Comment);
    let preview = notifications[0].data.comment.as_deref().expect("preview attached");
    assert_eq!(preview.chars().count(), 50);
    assert!(comment.content.starts_with(preview));
}

#[tokio::test]
async fn exact_single_comment_round_trip() {
    let client = client();
    let post = client.create_post("u1", "thread", Vec::new()).await.unwrap();
    client.add_comment(&post.id, "u2", "hello").await.unwrap();

    let page = client.list_recent_posts(None, None).await.unwrap();
    let view = page.posts.iter().find(|view| view.post.id == post.id).unwrap();
    assert_eq!(view.post.comments.len(), 1);
    assert_eq!(view.post.comments[0].content, "hello");
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let client = client();
    let post = client.create_post("u1", "post", Vec::new()).await.unwrap();
    let err = client.add_comment(&post.id, "u2", "  \n").await.unwrap_err();
    assert!(matches!(err, FeedError::Validation(_)));
}

#[tokio::test]
async fn oversized_comment_is_rejected() {
    let client = client();
    let post = client.create_post("u1", "post", Vec::new()).await.unwrap();
    let oversized = "x".repeat(1001);
    let err = client.add_comment(&post.id, "u2", &oversized).await.unwrap_err();
    assert!(matches!(err, FeedError::Validation(_)));
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let client = client();
    let err = client.add_comment("absent", "u2", "hi").await.unwrap_err();
    assert!(matches!(err, FeedError::NotFound { .. }));
}

#[tokio::test]
async fn mark_notifications_read_skips_missing_ids() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    let post = client.create_post("u1", "popular", Vec::new()).await.unwrap();
    client.toggle_like(&post.id, "u2").await.unwrap();
    client.toggle_like(&post.id, "u3").await.unwrap();

    let unread = client.unread_notifications("u1", 10).await.unwrap();
    assert_eq!(unread.len(), 2);

    let mut ids: Vec<String> = unread.iter().map(|n| n.id.clone()).collect();
    ids.push("missing-notification".to_string());
    let updated = client.mark_notifications_read(&ids).await.unwrap();
    assert_eq!(updated, 2);

    assert!(client.unread_notifications("u1", 10).await.unwrap().is_empty());
}
