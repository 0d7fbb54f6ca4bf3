//! CP Mentor - Application Entry Point
//!
//! This is the main entry point for the tutoring API server.

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, middleware};
use redis::Client as RedisClient;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use cpmentor::{
    config::CONFIG,
    constants::{API_BASE_PATH, MAX_REQUEST_BODY_BYTES},
    db,
    handlers,
    judge::{CodeExecutor, PythonRunner},
    mentor::{AnthropicClient, MentorService},
    middleware::{logging_middleware, rate_limit_middleware},
    ml::ModelRegistry,
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(&CONFIG.server.rust_log, CONFIG.server.json_logs);

    tracing::info!("Starting CP Mentor server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&CONFIG.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Redis connection
    tracing::info!("Connecting to Redis...");
    let redis_client = RedisClient::open(CONFIG.redis.url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    // Load classifiers
    tracing::info!("Loading classifiers...");
    let models = Arc::new(ModelRegistry::load(&CONFIG.models)?);

    let executor = CodeExecutor::new(Arc::new(PythonRunner::new(&CONFIG.judge)));
    let mentor = MentorService::new(Arc::new(AnthropicClient::new(&CONFIG.llm)?));

    // Create application state
    let state = AppState::new(db_pool, redis_conn, executor, models, mentor);

    // Build the router
    let app = Router::new()
        .nest(API_BASE_PATH, handlers::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
