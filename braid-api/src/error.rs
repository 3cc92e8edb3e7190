use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{CommentId, PostId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Comment text must not be empty")]
    EmptyText,

    #[error("Cannot reply more than {limit} levels deep")]
    DepthExceeded { limit: u32 },

    #[error("Comment {0:?} does not exist")]
    CommentNotFound(CommentId),

    #[error("Parent comment {0:?} does not exist")]
    ParentNotFound(CommentId),

    #[error("Parent comment {parent:?} does not belong to post {post:?}")]
    ParentPostMismatch { parent: CommentId, post: PostId },

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// Wraps a store-level failure. The underlying detail goes to the log,
    /// the caller only sees a generic message.
    pub fn storage(err: anyhow::Error) -> Error {
        tracing::error!(?err, "flat store operation failed");
        Error::Unknown(String::from("Internal storage error"))
    }

    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::EmptyText => StatusCode::BAD_REQUEST,
            Error::DepthExceeded { .. } => StatusCode::BAD_REQUEST,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::ParentNotFound(_) => StatusCode::BAD_REQUEST,
            Error::ParentPostMismatch { .. } => StatusCode::BAD_REQUEST,
            // never emitted by the server, only synthesized client-side
            Error::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::EmptyText => json!({
                "message": self.to_string(),
                "type": "empty-text",
            }),
            Error::DepthExceeded { limit } => json!({
                "message": self.to_string(),
                "type": "depth-exceeded",
                "limit": limit,
            }),
            Error::CommentNotFound(id) => json!({
                "message": self.to_string(),
                "type": "comment-not-found",
                "comment_id": id,
            }),
            Error::ParentNotFound(id) => json!({
                "message": self.to_string(),
                "type": "parent-not-found",
                "comment_id": id,
            }),
            Error::ParentPostMismatch { parent, post } => json!({
                "message": self.to_string(),
                "type": "parent-post-mismatch",
                "comment_id": parent,
                "post_id": post,
            }),
            Error::Transport(msg) => json!({
                "message": msg,
                "type": "transport",
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let get_comment_id = || -> anyhow::Result<CommentId> {
            Ok(CommentId(
                data.get("comment_id")
                    .and_then(|id| id.as_i64())
                    .ok_or_else(|| anyhow!("error is about a comment but has no comment_id"))?,
            ))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "empty-text" => Error::EmptyText,
                "depth-exceeded" => Error::DepthExceeded {
                    limit: data
                        .get("limit")
                        .and_then(|l| l.as_u64())
                        .ok_or_else(|| anyhow!("depth error without a proper limit"))?
                        as u32,
                },
                "comment-not-found" => Error::CommentNotFound(get_comment_id()?),
                "parent-not-found" => Error::ParentNotFound(get_comment_id()?),
                "parent-post-mismatch" => Error::ParentPostMismatch {
                    parent: get_comment_id()?,
                    post: PostId(
                        data.get("post_id")
                            .and_then(|id| id.as_i64())
                            .ok_or_else(|| anyhow!("post mismatch error without a post_id"))?,
                    ),
                },
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
