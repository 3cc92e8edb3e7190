use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{Comment, DELETED_PLACEHOLDER};

mod depth;
pub use depth::{validate_reply_depth, MAX_DEPTH};

mod error;
pub use error::Error;

mod store;
pub use store::Store;

pub mod service;

pub mod thread;
pub use thread::{build_tree, compute_depth, CommentNode};

mod transport;
pub use transport::Transport;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub i64);

impl CommentId {
    /// Durable ids are assigned by the server and are always positive;
    /// negative ids mark client-side provisional nodes awaiting confirmation.
    pub fn is_provisional(self) -> bool {
        self.0 < 0
    }

    pub fn stub() -> CommentId {
        CommentId(0)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub i64);

impl UserId {
    pub fn stub() -> UserId {
        UserId(0)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub i64);

impl PostId {
    pub fn stub() -> PostId {
        PostId(0)
    }
}

/// Body of `POST /comment`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub user_id: UserId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub text: String,
}

/// Body of `PATCH /comment`. `vote_count` is the absolute new value, not a delta.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UpdateVote {
    pub comment_id: CommentId,
    pub vote_count: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}
