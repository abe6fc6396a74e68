use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tera::Tera;
use tintero::config::Config;
use tintero::db::repositories::{
    SessionRepository, SqlxCategoryRepository, SqlxCommentRepository, SqlxPostRepository,
    SqlxSessionRepository, SqlxUserRepository,
};
use tintero::db::{create_pool, migrations};
use tintero::services::{CategoryService, CommentService, PostService, UserService};
use tintero::web::{build_router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tintero=info,tower_http=info")),
        )
        .init();

    let config = Config::load(Path::new("config.yml")).context("Failed to load configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to open database")?;
    migrations::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let sessions = SqlxSessionRepository::boxed(pool.clone());
    let removed = sessions
        .delete_expired()
        .await
        .context("Failed to clean up expired sessions")?;
    if removed > 0 {
        tracing::info!("Removed {} expired session(s)", removed);
    }

    let users = Arc::new(UserService::new(
        SqlxUserRepository::boxed(pool.clone()),
        sessions,
        config.session.expiration_days,
    ));
    let posts = Arc::new(PostService::new(
        SqlxPostRepository::boxed(pool.clone()),
        config.media.clone(),
    ));
    let categories = Arc::new(CategoryService::new(SqlxCategoryRepository::boxed(
        pool.clone(),
    )));
    let comments = Arc::new(CommentService::new(SqlxCommentRepository::boxed(pool)));

    if let Some(bootstrap) = &config.bootstrap {
        users
            .ensure_superuser(bootstrap)
            .await
            .context("Failed to create bootstrap superuser")?;
    }

    let templates =
        Arc::new(Tera::new(&config.templates.glob).context("Failed to load templates")?);

    let state = AppState {
        users,
        posts,
        categories,
        comments,
        templates,
        media: Arc::new(config.media.clone()),
        session_days: config.session.expiration_days,
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
