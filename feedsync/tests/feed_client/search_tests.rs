use super::support::*;

#[tokio::test]
async fn short_queries_short_circuit_without_store_calls() {
    let store = CountingStore::new(MemoryStore::new());
    let client = FeedClient::new(store);

    for query in ["", "a", "я"] {
        let hits = client.search(query).await.unwrap();
        assert!(hits.is_empty(), "query {query:?}");
    }
    assert_eq!(client.store().calls(), 0);
}

#[tokio::test]
async fn prefix_search_returns_independent_lists() {
    let client = client();
    seed_user(&client, "u1", "Alice Anders").await;
    seed_user(&client, "u2", "Albert").await;
    seed_user(&client, "u3", "Bob").await;
    client.create_post("u1", "Hello world", Vec::new()).await.unwrap();
    client.create_post("u2", "Help wanted", Vec::new()).await.unwrap();
    client.create_post("u3", "Unrelated", Vec::new()).await.unwrap();

    let hits = client.search("Al").await.unwrap();
    assert_eq!(hits.users.len(), 2);
    assert!(hits.posts.is_empty());

    let hits = client.search("Hel").await.unwrap();
    assert!(hits.users.is_empty());
    assert_eq!(hits.posts.len(), 2);
}

#[tokio::test]
async fn results_are_capped_per_list() {
    let client = client();
    for i in 0..12 {
        client
            .create_post("u1", &format!("Hello again {i}"), Vec::new())
            .await
            .unwrap();
    }
    let hits = client.search("Hello").await.unwrap();
    assert_eq!(hits.posts.len(), 10);
}

#[tokio::test]
async fn prefix_match_is_anchored_at_the_start() {
    let client = client();
    client.create_post("u1", "say Hello", Vec::new()).await.unwrap();
    let hits = client.search("Hello").await.unwrap();
    assert!(hits.posts.is_empty(), "infix matches are not prefix matches");
}
