use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use braid_api::{
    service, CommentId, CommentListResponse, CommentResponse, NewComment, PostId, UpdateVote,
};

use crate::{db::PostgresStore, extractors::*, Error};

pub async fn create_comment(
    mut conn: PgConn,
    Json(data): Json<NewComment>,
) -> Result<(StatusCode, Json<CommentResponse>), Error> {
    let comment = service::create_comment(&mut PostgresStore { conn: &mut *conn }, &data).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

#[derive(serde::Deserialize)]
pub struct ListParams {
    pub post_id: Option<PostId>,
}

pub async fn list_comments(
    mut conn: PgConn,
    Query(params): Query<ListParams>,
) -> Result<Json<CommentListResponse>, Error> {
    let comments =
        service::list_comments(&mut PostgresStore { conn: &mut *conn }, params.post_id).await?;
    Ok(Json(CommentListResponse { comments }))
}

pub async fn get_comment(
    mut conn: PgConn,
    Path(comment_id): Path<i64>,
) -> Result<Json<CommentResponse>, Error> {
    let comment = service::get_comment(
        &mut PostgresStore { conn: &mut *conn },
        CommentId(comment_id),
    )
    .await?;
    Ok(Json(CommentResponse { comment }))
}

pub async fn update_vote(mut conn: PgConn, Json(data): Json<UpdateVote>) -> Result<(), Error> {
    Ok(service::update_vote(&mut PostgresStore { conn: &mut *conn }, &data).await?)
}

pub async fn delete_comment(mut conn: PgConn, Path(comment_id): Path<i64>) -> Result<(), Error> {
    Ok(service::delete_comment(
        &mut PostgresStore { conn: &mut *conn },
        CommentId(comment_id),
    )
    .await?)
}
