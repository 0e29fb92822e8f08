mod authentication;
mod avatars;
pub mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod storage;

use anyhow::Context;
pub use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
pub use errors::{RequestErrorJson, RequestErrorJsonWrapper};
use handlers::*;
pub use models::Role;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use storage::FileStorage;
use tower_http::trace::TraceLayer;
use tracing::info;

pub type JsonResponse<T> = (StatusCode, Json<T>);

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub async fn run_app(app: Router, config: Config) -> Result<()> {
    let app = attach_state(app, &config).await?;
    info!("Listening on {}", config.bind_address);
    axum::Server::bind(&config.bind_address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Opens the database and file storage and layers them onto the router.
pub async fn attach_state(app: Router, config: &Config) -> Result<Router> {
    let db = init_db(&config.database_url).await?;
    let storage = FileStorage::new(&config.storage_dir, &config.public_url);
    storage
        .init()
        .await
        .with_context(|| format!("Failed to create {}", storage.dir().display()))?;
    info!("Serving files under {}", storage.public_url());
    Ok(app
        .layer(Extension(Arc::new(storage)))
        .layer(Extension(Arc::new(db)))
        .layer(Extension(Arc::new(config.clone())))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http()))
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {db_url}"))?;
    } else {
        info!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        // account service
        .route("/account", post(register_user).get(get_current_user))
        .route("/account/sessions", post(login_user))
        .route("/account/sessions/current", delete(logout_user))
        .route("/account/saves", get(list_my_saves))
        .route("/account/saved-posts", get(list_my_saved_posts))
        .route("/avatars/initials", get(initials_avatar))
        // users
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).put(update_user))
        .route("/users/:id/posts", get(list_user_posts))
        .route(
            "/admin/users/:id",
            put(admin_update_user).delete(admin_delete_user),
        )
        // posts
        .route("/posts", post(create_post).get(list_infinite_posts))
        .route("/posts/recent", get(list_recent_posts))
        .route("/posts/search", get(search_posts))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/posts/:id/likes", put(like_post))
        .route("/posts/:id/saves", post(save_post))
        .route("/saves/:id", delete(delete_saved_post))
        // messages
        .route("/messages", post(send_message).get(list_messages))
        .route("/messages/with/:user_id", get(list_conversation))
        .route("/messages/:id", delete(delete_message))
        // calendar events
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", put(update_event).delete(delete_event))
        // file storage
        .route("/storage/files", post(create_file))
        .route("/storage/files/:id", delete(remove_file))
        .route("/storage/files/:id/view", get(view_file))
        .route("/storage/files/:id/preview", get(preview_file))
        .fallback(not_found)
}
