//! Prefix search over user display names and post content.

use crate::errors::FeedError;
use crate::model::{Post, SearchHits, UserProfile, collections};
use crate::store::{Query, Store};

/// Queries shorter than this never reach the store.
pub const MIN_QUERY_LEN: usize = 2;

impl<S: Store> super::FeedClient<S> {
    /// Two independent bounded prefix lookups; the lists are not merged or
    /// ranked against each other.
    pub async fn search(&self, query: &str) -> Result<SearchHits, FeedError> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(SearchHits::default());
        }

        let users_query = Query::prefix(collections::USERS, "display_name", query, self.config.search_limit);
        let posts_query = Query::prefix(collections::POSTS, "content", query, self.config.search_limit);
        let (user_docs, post_docs) = tokio::try_join!(
            self.call(self.store.query(users_query)),
            self.call(self.store.query(posts_query)),
        )?;

        let mut hits = SearchHits::default();
        for doc in user_docs {
            hits.users.push(doc.deserialize::<UserProfile>()?);
        }
        for doc in post_docs {
            hits.posts.push(doc.deserialize::<Post>()?);
        }
        Ok(hits)
    }
}
