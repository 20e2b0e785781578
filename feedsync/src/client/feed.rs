//! Paginated feed reads with author and shared-post resolution.

use futures::future::join_all;

use crate::errors::FeedError;
use crate::model::{AuthorCard, Post, PostView, SharedPostView, collections};
use crate::store::{Cursor, Query, Store};

/// One page of the feed, newest first. `next_cursor` is present only when
/// the page was full, i.e. more posts may exist.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<PostView>,
    pub next_cursor: Option<Cursor>,
}

impl<S: Store> super::FeedClient<S> {
    /// Fetch posts ordered by creation time descending.
    ///
    /// Author cards and shared-post references resolve concurrently, but
    /// the page is assembled in query order once every resolution settles;
    /// arrival order never leaks into the result. A failed or missing
    /// author degrades that one card to the placeholder instead of
    /// aborting the page.
    pub async fn list_recent_posts(&self, limit: Option<u64>, cursor: Option<Cursor>) -> Result<FeedPage, FeedError> {
        let limit = limit.unwrap_or(self.config.page_size);
        let mut query = Query::recent(collections::POSTS, limit);
        if let Some(cursor) = cursor {
            query = query.after(cursor);
        }
        let docs = self.call(self.store.query(query)).await?;
        let mut posts = Vec::with_capacity(docs.len());
        for doc in docs {
            posts.push(doc.deserialize::<Post>()?);
        }

        let views = join_all(posts.into_iter().map(|post| self.resolve_view(post))).await;
        let next_cursor = if views.len() as u64 == limit {
            views.last().map(|view| Cursor {
                created_at_micros: view.post.created_at.timestamp_micros(),
                id: view.post.id.clone(),
            })
        } else {
            None
        };
        Ok(FeedPage {
            posts: views,
            next_cursor,
        })
    }

    async fn resolve_view(&self, post: Post) -> PostView {
        let author = self.resolve_author(&post.author_id).await;
        let shared = match &post.shared_post_id {
            Some(original_id) => Some(self.resolve_shared(original_id).await),
            None => None,
        };
        PostView { post, author, shared }
    }

    pub(crate) async fn resolve_author(&self, uid: &str) -> AuthorCard {
        match self.get_profile(uid).await {
            Ok(Some(profile)) => AuthorCard::from(&profile),
            Ok(None) => AuthorCard::unknown(uid),
            Err(err) => {
                log::warn!("author lookup failed for {uid}: {err}");
                AuthorCard::unknown(uid)
            }
        }
    }

    async fn resolve_shared(&self, original_id: &str) -> SharedPostView {
        let unavailable = || SharedPostView::Unavailable {
            post_id: original_id.to_string(),
        };
        match self.call(self.store.get(collections::POSTS, original_id)).await {
            Ok(Some(doc)) => match doc.deserialize::<Post>() {
                Ok(post) => {
                    let author = self.resolve_author(&post.author_id).await;
                    SharedPostView::Available { post, author }
                }
                Err(err) => {
                    log::warn!("shared post {original_id} failed to decode: {err}");
                    unavailable()
                }
            },
            Ok(None) => unavailable(),
            Err(err) => {
                log::warn!("shared post lookup failed for {original_id}: {err}");
                unavailable()
            }
        }
    }
}
