use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};

mod db;
mod error;
mod extractors;
mod handlers;

pub use error::Error;
use extractors::{AppState, PgPool};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(structopt::StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(short, long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = create_sqlx_pool(&db_url).await?;
    MIGRATOR
        .run(&db)
        .await
        .context("applying pending migrations")?;

    let app = app(PgPool::new(db));
    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}

async fn create_sqlx_pool(url: &str) -> anyhow::Result<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .connect(url)
        .await
        .with_context(|| format!("opening database {:?}", url))
}

pub fn app(db: PgPool) -> Router {
    Router::new()
        .route(
            "/comment",
            post(handlers::create_comment)
                .get(handlers::list_comments)
                .patch(handlers::update_vote),
        )
        .route(
            "/comment/:comment_id",
            get(handlers::get_comment).delete(handlers::delete_comment),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(AppState { db })
}
