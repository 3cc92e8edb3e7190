use async_trait::async_trait;

use crate::api::{
    Comment, CommentId, CommentListResponse, CommentResponse, Error, NewComment, PostId, Transport,
    UpdateVote,
};

/// [`Transport`] over HTTP, pointed at a running braid server.
///
/// The HTTP status code is the sole success signal; failure bodies carry
/// the structured error format and parse back into [`Error`], and anything
/// that never reached the server becomes [`Error::Transport`].
pub struct HttpApi {
    host: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(host: String) -> HttpApi {
        HttpApi {
            host: host.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }
}

fn transport_err(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

async fn error_from_response(resp: reqwest::Response) -> Error {
    let status = resp.status();
    match resp.bytes().await {
        Ok(body) => Error::parse(&body).unwrap_or_else(|err| {
            tracing::warn!(?err, "failure body did not parse as a structured error");
            Error::Unknown(format!("unexpected response with status {status}"))
        }),
        Err(err) => transport_err(err),
    }
}

#[async_trait]
impl Transport for HttpApi {
    async fn create_comment(&mut self, new: &NewComment) -> Result<Comment, Error> {
        let resp = self
            .client
            .post(format!("{}/comment", self.host))
            .json(new)
            .send()
            .await
            .map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let data: CommentResponse = resp.json().await.map_err(transport_err)?;
        Ok(data.comment)
    }

    async fn list_comments(&mut self, post: Option<PostId>) -> Result<Vec<Comment>, Error> {
        let mut req = self.client.get(format!("{}/comment", self.host));
        if let Some(post) = post {
            req = req.query(&[("post_id", post.0)]);
        }
        let resp = req.send().await.map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let data: CommentListResponse = resp.json().await.map_err(transport_err)?;
        Ok(data.comments)
    }

    async fn get_comment(&mut self, id: CommentId) -> Result<Comment, Error> {
        let resp = self
            .client
            .get(format!("{}/comment/{}", self.host, id.0))
            .send()
            .await
            .map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let data: CommentResponse = resp.json().await.map_err(transport_err)?;
        Ok(data.comment)
    }

    async fn update_vote(&mut self, vote: &UpdateVote) -> Result<(), Error> {
        let resp = self
            .client
            .patch(format!("{}/comment", self.host))
            .json(vote)
            .send()
            .await
            .map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        let resp = self
            .client
            .delete(format!("{}/comment/{}", self.host, id.0))
            .send()
            .await
            .map_err(transport_err)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }
}
