use async_trait::async_trait;

use crate::{Comment, CommentId, PostId, Time, UserId};

/// The durable flat store of comment records, as the comment service sees
/// it. Implemented over Postgres by the server and in memory by the mock
/// server, so the service logic on top is identical on both.
#[async_trait]
pub trait Store {
    /// Persists a new record and returns it with its store-assigned id.
    async fn insert(
        &mut self,
        author: UserId,
        post: PostId,
        parent: Option<CommentId>,
        text: &str,
        created_at: Time,
    ) -> anyhow::Result<Comment>;

    /// All records, optionally filtered by post, ordered by creation time
    /// ascending (ties broken by id).
    async fn list_by_post(&mut self, post: Option<PostId>) -> anyhow::Result<Vec<Comment>>;

    async fn get(&mut self, id: CommentId) -> anyhow::Result<Option<Comment>>;

    async fn set_vote_count(&mut self, id: CommentId, vote_count: i64) -> anyhow::Result<()>;

    /// Removes a record and every descendant reachable through `parent_id`
    /// chains, as one logical operation.
    async fn remove_subtree(&mut self, id: CommentId) -> anyhow::Result<()>;

    /// Nesting depth of a record (0 for roots), or `None` if it does not
    /// exist. One query against the store, not a hop-per-ancestor walk.
    async fn depth_of(&mut self, id: CommentId) -> anyhow::Result<Option<u32>>;
}
