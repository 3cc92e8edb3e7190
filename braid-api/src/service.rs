//! The authoritative comment service: request validation, the depth policy
//! check against the durable store, and the store mutation itself.
//!
//! Generic over [`Store`] so the Postgres-backed server and the in-memory
//! mock run exactly this code; the client runs the same
//! [`validate_reply_depth`](crate::validate_reply_depth) against its local
//! tree before it ever calls in here.

use chrono::Utc;

use crate::{
    validate_reply_depth, Comment, CommentId, Error, NewComment, PostId, Store, UpdateVote,
};

pub async fn create_comment<S: Store>(store: &mut S, new: &NewComment) -> Result<Comment, Error> {
    let text = new.text.trim();
    if text.is_empty() {
        return Err(Error::EmptyText);
    }
    if let Some(parent) = new.parent_id {
        let parent_comment = store
            .get(parent)
            .await
            .map_err(Error::storage)?
            .ok_or(Error::ParentNotFound(parent))?;
        if parent_comment.post_id != new.post_id {
            return Err(Error::ParentPostMismatch {
                parent,
                post: new.post_id,
            });
        }
        let parent_depth = store
            .depth_of(parent)
            .await
            .map_err(Error::storage)?
            .ok_or(Error::ParentNotFound(parent))?;
        validate_reply_depth(parent_depth)?;
    }
    store
        .insert(new.user_id, new.post_id, new.parent_id, text, Utc::now())
        .await
        .map_err(Error::storage)
}

pub async fn list_comments<S: Store>(
    store: &mut S,
    post: Option<PostId>,
) -> Result<Vec<Comment>, Error> {
    store.list_by_post(post).await.map_err(Error::storage)
}

pub async fn get_comment<S: Store>(store: &mut S, id: CommentId) -> Result<Comment, Error> {
    store
        .get(id)
        .await
        .map_err(Error::storage)?
        .ok_or(Error::CommentNotFound(id))
}

/// Persists the absolute new count unconditionally: no bounds, no ownership
/// check, and an unknown id is a no-op, preserving the unrestricted-repeat
/// voting behavior this feature ships with.
pub async fn update_vote<S: Store>(store: &mut S, vote: &UpdateVote) -> Result<(), Error> {
    store
        .set_vote_count(vote.comment_id, vote.vote_count)
        .await
        .map_err(Error::storage)
}

/// Hard-deletes the comment and its whole reply subtree; descendants must
/// never be left behind as orphaned roots.
pub async fn delete_comment<S: Store>(store: &mut S, id: CommentId) -> Result<(), Error> {
    store
        .get(id)
        .await
        .map_err(Error::storage)?
        .ok_or(Error::CommentNotFound(id))?;
    store.remove_subtree(id).await.map_err(Error::storage)
}
