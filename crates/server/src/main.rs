//! Quill server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use fred::prelude::*;
use quill_common::Config;
use quill_core::{
    CacheBackend, CommentService, FeedCache, FeedService, FollowService, GroupService,
    PostService, RedisCache, UserService,
};
use quill_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use quill_web::{AppState, router};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quill server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = quill_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    // Connect to Redis for the feed cache
    info!("Connecting to Redis...");
    let redis_config = fred::types::config::Config::from_url(&config.redis.url)?;
    let redis_client = fred::clients::Client::new(redis_config, None, None, None);
    redis_client.connect();
    redis_client.wait_for_connect().await?;
    let redis_client = Arc::new(redis_client);
    info!("Connected to Redis");

    let cache_backend: Arc<dyn CacheBackend> = Arc::new(RedisCache::new(
        redis_client,
        config.redis.prefix.clone(),
    ));
    let feed_cache = FeedCache::new(cache_backend, &config.cache);

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // Assemble services
    let state = AppState {
        feed_service: FeedService::new(
            post_repo.clone(),
            group_repo.clone(),
            user_repo.clone(),
            follow_repo.clone(),
        ),
        follow_service: FollowService::new(follow_repo),
        post_service: PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo.clone(),
            feed_cache.clone(),
        ),
        comment_service: CommentService::new(comment_repo, post_repo, user_repo.clone()),
        group_service: GroupService::new(group_repo),
        user_service: UserService::new(user_repo),
        feed_cache,
    };

    // Build router
    let app = router(state)
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
