use anyhow::Context;
use async_trait::async_trait;
use braid_api::{Comment, CommentId, PostId, Store, Time, UserId, MAX_DEPTH};
use sqlx::Row;

/// The durable flat store: a [`Store`] over one Postgres connection.
pub struct PostgresStore<'c> {
    pub conn: &'c mut sqlx::PgConnection,
}

const COMMENT_COLUMNS: &str =
    "comment_id, user_id, post_id, parent_id, text, vote_count, created_at, is_deleted";

fn comment_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Comment> {
    Ok(Comment {
        id: CommentId(
            row.try_get("comment_id")
                .context("retrieving the comment_id field")?,
        ),
        user_id: UserId(
            row.try_get("user_id")
                .context("retrieving the user_id field")?,
        ),
        post_id: PostId(
            row.try_get("post_id")
                .context("retrieving the post_id field")?,
        ),
        parent_id: row
            .try_get::<Option<i64>, _>("parent_id")
            .context("retrieving the parent_id field")?
            .map(CommentId),
        text: row.try_get("text").context("retrieving the text field")?,
        vote_count: row
            .try_get("vote_count")
            .context("retrieving the vote_count field")?,
        created_at: row
            .try_get("created_at")
            .context("retrieving the created_at field")?,
        is_deleted: row
            .try_get("is_deleted")
            .context("retrieving the is_deleted field")?,
    })
}

#[async_trait]
impl Store for PostgresStore<'_> {
    async fn insert(
        &mut self,
        author: UserId,
        post: PostId,
        parent: Option<CommentId>,
        text: &str,
        created_at: Time,
    ) -> anyhow::Result<Comment> {
        let row = sqlx::query(
            "
                INSERT INTO comments (user_id, post_id, parent_id, text, vote_count, created_at, is_deleted)
                VALUES ($1, $2, $3, $4, 0, $5, false)
                RETURNING comment_id
            ",
        )
        .bind(author.0)
        .bind(post.0)
        .bind(parent.map(|p| p.0))
        .bind(text)
        .bind(created_at)
        .fetch_one(&mut *self.conn)
        .await
        .context("inserting comment")?;
        Ok(Comment {
            id: CommentId(
                row.try_get("comment_id")
                    .context("retrieving the comment_id field")?,
            ),
            user_id: author,
            post_id: post,
            parent_id: parent,
            text: text.to_owned(),
            vote_count: 0,
            created_at,
            is_deleted: false,
        })
    }

    async fn list_by_post(&mut self, post: Option<PostId>) -> anyhow::Result<Vec<Comment>> {
        let rows = match post {
            Some(post) => {
                sqlx::query(&format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY created_at, comment_id",
                ))
                .bind(post.0)
                .fetch_all(&mut *self.conn)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY created_at, comment_id",
                ))
                .fetch_all(&mut *self.conn)
                .await
            }
        }
        .context("querying comments table")?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn get(&mut self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = $1",
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.conn)
        .await
        .context("querying comments table")?
        .as_ref()
        .map(comment_from_row)
        .transpose()
    }

    async fn set_vote_count(&mut self, id: CommentId, vote_count: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE comments SET vote_count = $2 WHERE comment_id = $1")
            .bind(id.0)
            .bind(vote_count)
            .execute(&mut *self.conn)
            .await
            .context("updating vote count")?;
        Ok(())
    }

    async fn remove_subtree(&mut self, id: CommentId) -> anyhow::Result<()> {
        // one statement, so the cascade commits or fails as a whole
        sqlx::query(
            "
                WITH RECURSIVE doomed AS (
                    SELECT comment_id FROM comments WHERE comment_id = $1
                    UNION ALL
                    SELECT c.comment_id
                        FROM comments c
                    INNER JOIN doomed d
                        ON c.parent_id = d.comment_id
                )
                DELETE FROM comments
                    WHERE comment_id IN (SELECT comment_id FROM doomed)
            ",
        )
        .bind(id.0)
        .execute(&mut *self.conn)
        .await
        .context("deleting comment subtree")?;
        Ok(())
    }

    async fn depth_of(&mut self, id: CommentId) -> anyhow::Result<Option<u32>> {
        // walk the parent chain upward in one recursive query; the hop cap
        // mirrors the engine's and keeps corrupted chains from recursing away
        let row = sqlx::query(
            "
                WITH RECURSIVE chain AS (
                    SELECT comment_id, parent_id, 0::bigint AS depth
                        FROM comments
                        WHERE comment_id = $1
                    UNION ALL
                    SELECT c.comment_id, c.parent_id, chain.depth + 1
                        FROM comments c
                    INNER JOIN chain
                        ON c.comment_id = chain.parent_id
                        WHERE chain.depth <= $2
                )
                SELECT MAX(depth) AS depth FROM chain
            ",
        )
        .bind(id.0)
        .bind(MAX_DEPTH as i64 + 1)
        .fetch_one(&mut *self.conn)
        .await
        .context("computing comment depth")?;
        Ok(row
            .try_get::<Option<i64>, _>("depth")
            .context("retrieving the depth field")?
            .map(|d| d as u32))
    }
}
