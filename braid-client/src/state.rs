use chrono::Utc;

use crate::api::{
    build_tree, validate_reply_depth, Comment, CommentId, CommentNode, Error, NewComment, PostId,
    Transport, UpdateVote, UserId, DELETED_PLACEHOLDER,
};

/// Direction of a vote; the wire carries the resulting absolute count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    fn delta(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

/// Client-side state of one post's comment thread.
///
/// Owns the materialized tree; rendering code reads it through [`tree`] and
/// mutates it only through the operations here. Every mutation is applied
/// to the tree synchronously before its network round trip starts and is
/// reconciled when the round trip ends, so a reader never observes a
/// half-updated subtree. While a round trip is in flight the caller may
/// issue further mutations; their optimistic effects stack in issuance
/// order, and one of them reverting does not unwind later ones that read
/// its effect. That window is part of the design, not a bug to close here.
///
/// [`tree`]: ThreadState::tree
#[derive(Debug)]
pub struct ThreadState {
    post: PostId,
    tree: Vec<CommentNode>,
    pending_reply_to: Option<CommentId>,
    last_error: Option<String>,
    is_busy: bool,
    /// Decreasing counter for provisional ids; the server only ever assigns
    /// positive ones, so the two can never collide.
    next_provisional: i64,
}

impl ThreadState {
    pub fn new(post: PostId) -> ThreadState {
        ThreadState {
            post,
            tree: Vec::new(),
            pending_reply_to: None,
            last_error: None,
            is_busy: false,
            next_provisional: 0,
        }
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn tree(&self) -> &[CommentNode] {
        &self.tree
    }

    pub fn pending_reply_to(&self) -> Option<CommentId> {
        self.pending_reply_to
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy
    }

    /// Records the failure for the UI and hands it back to the caller.
    fn fail(&mut self, err: Error) -> Error {
        self.last_error = Some(err.to_string());
        err
    }

    /// Fetches the full flat list for this post and rebuilds the tree
    /// wholesale. A failed fetch leaves the previous tree untouched.
    pub async fn load<A: Transport>(&mut self, api: &mut A) -> Result<(), Error> {
        self.is_busy = true;
        self.last_error = None;
        let fetched = api.list_comments(Some(self.post)).await;
        self.is_busy = false;
        match fetched {
            Ok(records) => {
                self.tree = build_tree(records);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Posts a comment, optimistically.
    ///
    /// Local rejections (blank text, parent missing from the tree, depth
    /// policy) happen before any tree mutation and without a network call.
    /// Past them, a provisional node with a negative id becomes visible
    /// immediately; on confirmation its record is swapped for the
    /// server-assigned one, on failure the node is removed again.
    pub async fn submit_comment<A: Transport>(
        &mut self,
        api: &mut A,
        author: UserId,
        parent: Option<CommentId>,
        text: &str,
    ) -> Result<CommentId, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Err(self.fail(Error::EmptyText));
        }
        let depth = match parent {
            None => 0,
            Some(parent_id) => {
                let parent_depth = match CommentNode::find_in(&mut self.tree, parent_id) {
                    Some(node) => node.depth,
                    None => return Err(self.fail(Error::ParentNotFound(parent_id))),
                };
                if let Err(err) = validate_reply_depth(parent_depth) {
                    return Err(self.fail(err));
                }
                parent_depth + 1
            }
        };

        self.next_provisional -= 1;
        let provisional = CommentId(self.next_provisional);
        let node = CommentNode {
            record: Comment {
                id: provisional,
                user_id: author,
                post_id: self.post,
                parent_id: parent,
                text: text.to_owned(),
                vote_count: 0,
                created_at: Utc::now(),
                is_deleted: false,
            },
            depth,
            children: Vec::new(),
        };
        match parent {
            None => self.tree.push(node),
            Some(parent_id) => match CommentNode::find_in(&mut self.tree, parent_id) {
                Some(parent_node) => parent_node.children.push(node),
                // the depth lookup above just found it and nothing ran since
                None => unreachable!("reply parent vanished from the local tree"),
            },
        }

        let new = NewComment {
            user_id: author,
            post_id: self.post,
            parent_id: parent,
            text: text.to_owned(),
        };
        match api.create_comment(&new).await {
            Ok(created) => {
                let id = created.id;
                match CommentNode::find_in(&mut self.tree, provisional) {
                    Some(node) => node.record = created,
                    // a load replaced the tree while the call was in flight
                    None => tracing::warn!(
                        ?provisional,
                        "provisional comment disappeared before confirmation"
                    ),
                }
                self.pending_reply_to = None;
                Ok(id)
            }
            Err(err) => {
                CommentNode::remove_in(&mut self.tree, provisional);
                Err(self.fail(err))
            }
        }
    }

    /// Applies the vote to the tree immediately; a failed round trip puts
    /// back the exact count from before the vote, not a recomputed one.
    /// Voting on a comment that is not in the tree is a no-op.
    pub async fn cast_vote<A: Transport>(
        &mut self,
        api: &mut A,
        id: CommentId,
        vote: Vote,
    ) -> Result<(), Error> {
        let previous = match CommentNode::find_in(&mut self.tree, id) {
            Some(node) => {
                let previous = node.record.vote_count;
                node.record.vote_count = previous + vote.delta();
                previous
            }
            None => return Ok(()),
        };
        let update = UpdateVote {
            comment_id: id,
            vote_count: previous + vote.delta(),
        };
        match api.update_vote(&update).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(node) = CommentNode::find_in(&mut self.tree, id) {
                    node.record.vote_count = previous;
                }
                Err(self.fail(err))
            }
        }
    }

    /// Marks the comment deleted locally and shows the placeholder text,
    /// then asks the server to delete. The server hard-deletes the whole
    /// subtree; the placeholder stands in until the next load drops it. A
    /// failed round trip restores the entire pre-mutation tree.
    pub async fn soft_delete<A: Transport>(
        &mut self,
        api: &mut A,
        id: CommentId,
    ) -> Result<(), Error> {
        let snapshot = self.tree.clone();
        match CommentNode::find_in(&mut self.tree, id) {
            Some(node) => {
                node.record.is_deleted = true;
                node.record.text = DELETED_PLACEHOLDER.to_owned();
            }
            None => return Ok(()),
        }
        match api.delete_comment(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.tree = snapshot;
                Err(self.fail(err))
            }
        }
    }

    /// Pure state toggle for "which comment is being replied to"; cleared
    /// automatically when a submission is confirmed.
    pub fn set_pending_reply_to(&mut self, id: Option<CommentId>) {
        self.pending_reply_to = id;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use braid_mock_server::MockServer;

    use super::*;
    use crate::api::MAX_DEPTH;

    /// A transport with the cable unplugged.
    struct FailingApi;

    #[async_trait]
    impl Transport for FailingApi {
        async fn create_comment(&mut self, _new: &NewComment) -> Result<Comment, Error> {
            Err(Error::Transport(String::from("connection refused")))
        }

        async fn list_comments(&mut self, _post: Option<PostId>) -> Result<Vec<Comment>, Error> {
            Err(Error::Transport(String::from("connection refused")))
        }

        async fn get_comment(&mut self, _id: CommentId) -> Result<Comment, Error> {
            Err(Error::Transport(String::from("connection refused")))
        }

        async fn update_vote(&mut self, _vote: &UpdateVote) -> Result<(), Error> {
            Err(Error::Transport(String::from("connection refused")))
        }

        async fn delete_comment(&mut self, _id: CommentId) -> Result<(), Error> {
            Err(Error::Transport(String::from("connection refused")))
        }
    }

    fn author() -> UserId {
        UserId(1)
    }

    /// Submits the A → B → C → D chain (depths 0..=3) and returns the ids.
    async fn submit_chain(state: &mut ThreadState, server: &mut MockServer) -> Vec<CommentId> {
        let mut ids = Vec::new();
        let mut parent = None;
        for text in ["A", "B", "C", "D"] {
            let id = state
                .submit_comment(server, author(), parent, text)
                .await
                .unwrap_or_else(|e| panic!("submitting {text}: {e}"));
            parent = Some(id);
            ids.push(id);
        }
        ids
    }

    #[tokio::test]
    async fn confirmed_submission_swaps_the_provisional_id() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let id = state
            .submit_comment(&mut server, author(), None, "hello")
            .await
            .unwrap();
        assert!(!id.is_provisional());
        assert_eq!(state.tree().len(), 1);
        assert_eq!(state.tree()[0].record.id, id);
        assert_eq!(server.test_comment(id).unwrap().text, "hello");
    }

    #[tokio::test]
    async fn replies_nest_under_their_parent() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let ids = submit_chain(&mut state, &mut server).await;
        assert_eq!(state.tree().len(), 1);
        let b = &state.tree()[0].children[0];
        assert_eq!(b.record.id, ids[1]);
        assert_eq!(b.depth, 1);
        assert_eq!(b.children[0].children[0].record.id, ids[3]);
        assert_eq!(b.children[0].children[0].depth, 3);
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_server() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let err = state
            .submit_comment(&mut server, author(), None, "  \n ")
            .await
            .unwrap_err();
        assert_eq!(err, Error::EmptyText);
        assert!(state.tree().is_empty());
        assert_eq!(server.test_num_comments(), 0);
        assert!(state.last_error().is_some());
    }

    #[tokio::test]
    async fn reply_to_a_parent_missing_from_the_tree_is_refused() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let err = state
            .submit_comment(&mut server, author(), Some(CommentId(41)), "orphan")
            .await
            .unwrap_err();
        assert_eq!(err, Error::ParentNotFound(CommentId(41)));
        assert_eq!(server.test_num_comments(), 0);
    }

    #[tokio::test]
    async fn reply_below_the_depth_limit_is_refused_before_any_mutation() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let ids = submit_chain(&mut state, &mut server).await;
        let err = state
            .submit_comment(&mut server, author(), Some(ids[3]), "too deep")
            .await
            .unwrap_err();
        assert_eq!(err, Error::DepthExceeded { limit: MAX_DEPTH });
        assert!(state.last_error().unwrap().contains("3 levels deep"));
        assert_eq!(CommentNode::flatten(state.tree()).len(), 4);
        assert_eq!(server.test_num_comments(), 4);
    }

    #[tokio::test]
    async fn failed_submission_removes_the_provisional_node() {
        let mut state = ThreadState::new(PostId(1));
        let err = state
            .submit_comment(&mut FailingApi, author(), None, "lost")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(state.tree().is_empty());
        assert!(state.last_error().is_some());
    }

    #[tokio::test]
    async fn votes_confirm_up_then_down_twice() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let id = state
            .submit_comment(&mut server, author(), None, "A")
            .await
            .unwrap();
        server
            .update_vote(&UpdateVote {
                comment_id: id,
                vote_count: 5,
            })
            .await
            .unwrap();
        state.load(&mut server).await.unwrap();

        state.cast_vote(&mut server, id, Vote::Up).await.unwrap();
        assert_eq!(server.test_comment(id).unwrap().vote_count, 6);
        state.cast_vote(&mut server, id, Vote::Down).await.unwrap();
        state.cast_vote(&mut server, id, Vote::Down).await.unwrap();
        assert_eq!(state.tree()[0].record.vote_count, 4);
        assert_eq!(server.test_comment(id).unwrap().vote_count, 4);
    }

    #[tokio::test]
    async fn failed_vote_restores_the_exact_previous_count() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let id = state
            .submit_comment(&mut server, author(), None, "A")
            .await
            .unwrap();
        server
            .update_vote(&UpdateVote {
                comment_id: id,
                vote_count: 5,
            })
            .await
            .unwrap();
        state.load(&mut server).await.unwrap();

        let err = state
            .cast_vote(&mut FailingApi, id, Vote::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(state.tree()[0].record.vote_count, 5);
        assert!(state.last_error().is_some());
    }

    #[tokio::test]
    async fn voting_on_an_unknown_comment_is_a_noop() {
        let mut state = ThreadState::new(PostId(1));
        // FailingApi would turn any transport call into an error
        state
            .cast_vote(&mut FailingApi, CommentId(7), Vote::Up)
            .await
            .unwrap();
        assert!(state.last_error().is_none());
    }

    #[tokio::test]
    async fn soft_delete_shows_the_placeholder_until_the_next_load() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let ids = submit_chain(&mut state, &mut server).await;

        state.soft_delete(&mut server, ids[1]).await.unwrap();
        let mut tree = state.tree().to_vec();
        let b = CommentNode::find_in(&mut tree, ids[1]).unwrap();
        assert!(b.record.is_deleted);
        assert_eq!(b.record.text, DELETED_PLACEHOLDER);
        // locally the subtree is still visible under the placeholder
        assert!(!b.children.is_empty());

        // the server hard-deleted B and everything under it
        state.load(&mut server).await.unwrap();
        assert_eq!(CommentNode::flatten(state.tree()), vec![ids[0]]);
    }

    #[tokio::test]
    async fn failed_delete_restores_the_whole_snapshot() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let ids = submit_chain(&mut state, &mut server).await;
        let before = state.tree().to_vec();

        let err = state
            .soft_delete(&mut FailingApi, ids[1])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(state.tree(), &before[..]);
    }

    #[tokio::test]
    async fn failed_load_keeps_the_previous_tree() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        state
            .submit_comment(&mut server, author(), None, "kept")
            .await
            .unwrap();

        let err = state.load(&mut FailingApi).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(state.tree().len(), 1);
        assert!(!state.is_busy());
        assert!(state.last_error().is_some());
    }

    #[tokio::test]
    async fn load_only_sees_this_posts_comments() {
        let mut server = MockServer::new();
        let mut other = ThreadState::new(PostId(2));
        other
            .submit_comment(&mut server, author(), None, "elsewhere")
            .await
            .unwrap();

        let mut state = ThreadState::new(PostId(1));
        state.load(&mut server).await.unwrap();
        assert!(state.tree().is_empty());
    }

    #[tokio::test]
    async fn confirmed_submission_clears_the_pending_reply_target() {
        let mut server = MockServer::new();
        let mut state = ThreadState::new(PostId(1));
        let root = state
            .submit_comment(&mut server, author(), None, "root")
            .await
            .unwrap();
        state.set_pending_reply_to(Some(root));
        assert_eq!(state.pending_reply_to(), Some(root));
        state
            .submit_comment(&mut server, author(), Some(root), "reply")
            .await
            .unwrap();
        assert_eq!(state.pending_reply_to(), None);
    }
}
