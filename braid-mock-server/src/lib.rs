//! In-process stand-in for the comment server: the real service logic from
//! `braid_api::service` running over an in-memory flat store. Tests drive
//! the client state manager against it, and the server-side semantics are
//! exercised here without a database.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use braid_api::{
    compute_depth, service, Comment, CommentId, Error, NewComment, PostId, Store, Time, Transport,
    UpdateVote, UserId,
};
use tokio::sync::Mutex;

/// A [`Store`] kept as a plain vector in creation order.
#[derive(Debug, Default)]
pub struct MemStore {
    comments: Vec<Comment>,
    next_id: i64,
}

#[async_trait]
impl Store for MemStore {
    async fn insert(
        &mut self,
        author: UserId,
        post: PostId,
        parent: Option<CommentId>,
        text: &str,
        created_at: Time,
    ) -> anyhow::Result<Comment> {
        self.next_id += 1;
        let comment = Comment {
            id: CommentId(self.next_id),
            user_id: author,
            post_id: post,
            parent_id: parent,
            text: text.to_owned(),
            vote_count: 0,
            created_at,
            is_deleted: false,
        };
        self.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_by_post(&mut self, post: Option<PostId>) -> anyhow::Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| post.map_or(true, |p| c.post_id == p))
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn get(&mut self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        Ok(self.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn set_vote_count(&mut self, id: CommentId, vote_count: i64) -> anyhow::Result<()> {
        if let Some(c) = self.comments.iter_mut().find(|c| c.id == id) {
            c.vote_count = vote_count;
        }
        Ok(())
    }

    async fn remove_subtree(&mut self, id: CommentId) -> anyhow::Result<()> {
        let mut doomed: HashSet<CommentId> = HashSet::new();
        doomed.insert(id);
        loop {
            let more: Vec<CommentId> = self
                .comments
                .iter()
                .filter(|c| {
                    c.parent_id.map_or(false, |p| doomed.contains(&p)) && !doomed.contains(&c.id)
                })
                .map(|c| c.id)
                .collect();
            if more.is_empty() {
                break;
            }
            doomed.extend(more);
        }
        self.comments.retain(|c| !doomed.contains(&c.id));
        Ok(())
    }

    async fn depth_of(&mut self, id: CommentId) -> anyhow::Result<Option<u32>> {
        Ok(compute_depth(&self.comments, id))
    }
}

/// The mock server itself: one per test, no network, same outcomes as the
/// real thing.
#[derive(Debug, Default)]
pub struct MockServer {
    store: MemStore,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    pub async fn create_comment(&mut self, new: &NewComment) -> Result<Comment, Error> {
        service::create_comment(&mut self.store, new).await
    }

    pub async fn list_comments(&mut self, post: Option<PostId>) -> Result<Vec<Comment>, Error> {
        service::list_comments(&mut self.store, post).await
    }

    pub async fn get_comment(&mut self, id: CommentId) -> Result<Comment, Error> {
        service::get_comment(&mut self.store, id).await
    }

    pub async fn update_vote(&mut self, vote: &UpdateVote) -> Result<(), Error> {
        service::update_vote(&mut self.store, vote).await
    }

    pub async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        service::delete_comment(&mut self.store, id).await
    }

    /// Number of records currently stored, for test assertions.
    pub fn test_num_comments(&self) -> usize {
        self.store.comments.len()
    }

    /// Direct view of a stored record, for test assertions.
    pub fn test_comment(&self, id: CommentId) -> Option<&Comment> {
        self.store.comments.iter().find(|c| c.id == id)
    }
}

#[async_trait]
impl Transport for MockServer {
    async fn create_comment(&mut self, new: &NewComment) -> Result<Comment, Error> {
        MockServer::create_comment(self, new).await
    }

    async fn list_comments(&mut self, post: Option<PostId>) -> Result<Vec<Comment>, Error> {
        MockServer::list_comments(self, post).await
    }

    async fn get_comment(&mut self, id: CommentId) -> Result<Comment, Error> {
        MockServer::get_comment(self, id).await
    }

    async fn update_vote(&mut self, vote: &UpdateVote) -> Result<(), Error> {
        MockServer::update_vote(self, vote).await
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        MockServer::delete_comment(self, id).await
    }
}

/// Cloneable handle letting several simulated clients (or a polling loop)
/// share one server.
#[derive(Clone)]
pub struct SharedMockServer(Arc<Mutex<MockServer>>);

impl SharedMockServer {
    pub fn new(server: MockServer) -> SharedMockServer {
        SharedMockServer(Arc::new(Mutex::new(server)))
    }

    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, MockServer> {
        self.0.lock().await
    }
}

#[async_trait]
impl Transport for SharedMockServer {
    async fn create_comment(&mut self, new: &NewComment) -> Result<Comment, Error> {
        self.0.lock().await.create_comment(new).await
    }

    async fn list_comments(&mut self, post: Option<PostId>) -> Result<Vec<Comment>, Error> {
        self.0.lock().await.list_comments(post).await
    }

    async fn get_comment(&mut self, id: CommentId) -> Result<Comment, Error> {
        self.0.lock().await.get_comment(id).await
    }

    async fn update_vote(&mut self, vote: &UpdateVote) -> Result<(), Error> {
        self.0.lock().await.update_vote(vote).await
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        self.0.lock().await.delete_comment(id).await
    }
}
