use async_trait::async_trait;

use crate::{Comment, CommentId, Error, NewComment, PostId, UpdateVote};

/// The comment API as the client sees it across the wire. Implemented by
/// the reqwest-backed HTTP client and by the in-process mock server, so the
/// tree state manager can be driven against either.
#[async_trait]
pub trait Transport {
    async fn create_comment(&mut self, new: &NewComment) -> Result<Comment, Error>;

    async fn list_comments(&mut self, post: Option<PostId>) -> Result<Vec<Comment>, Error>;

    async fn get_comment(&mut self, id: CommentId) -> Result<Comment, Error>;

    async fn update_vote(&mut self, vote: &UpdateVote) -> Result<(), Error>;

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error>;
}
