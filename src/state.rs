//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{judge::CodeExecutor, mentor::MentorService, ml::ModelRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    db: PgPool,

    /// Redis connection manager (rate limiting)
    redis: ConnectionManager,

    /// Grades submitted code
    executor: CodeExecutor,

    /// Loaded classifiers, reloaded when their files change
    models: Arc<ModelRegistry>,

    /// Hint and recommendation text
    mentor: MentorService,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        executor: CodeExecutor,
        models: Arc<ModelRegistry>,
        mentor: MentorService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                executor,
                models,
                mentor,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get a reference to the code executor
    pub fn executor(&self) -> &CodeExecutor {
        &self.inner.executor
    }

    /// Get a reference to the classifier registry
    pub fn models(&self) -> &ModelRegistry {
        &self.inner.models
    }

    /// Get a reference to the mentor service
    pub fn mentor(&self) -> &MentorService {
        &self.inner.mentor
    }
}
