use crate::{CommentId, PostId, Time, UserId};

/// Text shown in place of a comment the client has optimistically deleted.
/// The durable store hard-deletes the record instead; the placeholder only
/// lives until the next load drops the subtree.
pub const DELETED_PLACEHOLDER: &str = "[Comment deleted]";

/// A comment as persisted and transported: flat, referencing its parent by
/// id. Nesting depth is never stored, it is recomputed from the parent
/// chain wherever it is needed.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    #[serde(rename = "comment_id")]
    pub id: CommentId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub text: String,
    pub vote_count: i64,
    pub created_at: Time,
    pub is_deleted: bool,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
