use std::time::Duration;

use feedsync::{SharedPostView, model::UNKNOWN_AUTHOR_NAME};

use super::support::*;

#[tokio::test]
async fn pages_walk_newest_first() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    for i in 0..25 {
        client
            .create_post("u1", &format!("post {i}"), Vec::new())
            .await
            .unwrap();
    }

    let first = client.list_recent_posts(None, None).await.unwrap();
    assert_eq!(first.posts.len(), 20, "default page size");
    let cursor = first.next_cursor.clone().expect("full page yields a cursor");

    let timestamps: Vec<_> = first.posts.iter().map(|view| view.post.created_at).collect();
    assert!(timestamps.windows(2).all(|w| w[0] > w[1]), "strictly newest first");
    assert_eq!(first.posts[0].post.content, "post 24");

    let second = client.list_recent_posts(None, Some(cursor)).await.unwrap();
    assert_eq!(second.posts.len(), 5);
    assert!(second.next_cursor.is_none(), "short page ends pagination");
    assert_eq!(second.posts[4].post.content, "post 0");

    // no overlap between pages
    let first_ids: Vec<_> = first.posts.iter().map(|view| view.post.id.clone()).collect();
    assert!(second.posts.iter().all(|view| !first_ids.contains(&view.post.id)));
}

#[tokio::test]
async fn explicit_limit_overrides_default() {
    let client = client();
    for i in 0..5 {
        client.create_post("u1", &format!("p{i}"), Vec::new()).await.unwrap();
    }
    let page = client.list_recent_posts(Some(3), None).await.unwrap();
    assert_eq!(page.posts.len(), 3);
    assert!(page.next_cursor.is_some());
}

#[tokio::test]
async fn missing_author_degrades_to_placeholder_without_failing_siblings() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    client.create_post("u1", "known author", Vec::new()).await.unwrap();
    client.create_post("ghost", "orphaned", Vec::new()).await.unwrap();

    let page = client.list_recent_posts(None, None).await.unwrap();
    assert_eq!(page.posts.len(), 2);

    let orphan = page.posts.iter().find(|view| view.post.content == "orphaned").unwrap();
    assert_eq!(orphan.author.display_name, UNKNOWN_AUTHOR_NAME);
    assert!(orphan.author.is_placeholder());

    let known = page.posts.iter().find(|view| view.post.content == "known author").unwrap();
    assert_eq!(known.author.display_name, "Alice");
}

#[tokio::test]
async fn share_of_live_post_resolves_original() {
    let client = client();
    seed_user(&client, "u1", "Alice").await;
    let original = client.create_post("u1", "original", Vec::new()).await.unwrap();
    client.share_post("u2", &original).await.unwrap();

    let page = client.list_recent_posts(None, None).await.unwrap();
    let share_view = page
        .posts
        .iter()
        .find(|view| view.post.shared_post_id.is_some())
        .expect("share in feed");
    match share_view.shared.as_ref().expect("shared state resolved") {
        SharedPostView::Available { post, author } => {
            assert_eq!(post.id, original.id);
            assert_eq!(author.display_name, "Alice");
        }
        SharedPostView::Unavailable { .. } => panic!("original is live"),
    }
}

#[tokio::test]
async fn dangling_share_renders_unavailable() {
    let client = client();
    let original = client.create_post("u1", "to be deleted", Vec::new()).await.unwrap();
    client.share_post("u2", &original).await.unwrap();
    client.delete_post("u1", &original.id).await.unwrap();

    let page = client.list_recent_posts(None, None).await.unwrap();
    assert_eq!(page.posts.len(), 1, "only the share remains");
    match page.posts[0].shared.as_ref().expect("dangling reference still resolves") {
        SharedPostView::Unavailable { post_id } => assert_eq!(post_id, &original.id),
        SharedPostView::Available { .. } => panic!("original was deleted"),
    }
}

#[tokio::test]
async fn timeouts_surface_as_store_unavailable() {
    let config = FeedConfig {
        op_timeout: Duration::from_millis(25),
        ..FeedConfig::default()
    };
    let client = FeedClient::with_config(HangingStore, config);

    let err = client.list_recent_posts(None, None).await.unwrap_err();
    assert!(matches!(err, FeedError::StoreUnavailable { .. }));
    assert!(err.is_retryable());
}
