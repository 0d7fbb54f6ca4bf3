//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Interpreter used for syntax checks and test execution
pub const DEFAULT_PYTHON_BIN: &str = "python3";

/// Wall-clock limit per test case execution
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 5;

/// Largest stdout or stderr kept from one execution
pub const DEFAULT_OUTPUT_LIMIT_BYTES: u64 = 8 * 1024 * 1024;

/// Maximum number of characters of each side shown in a line diff
pub const DIFF_PREVIEW_CHARS: usize = 40;

/// Maximum source code size accepted by the submit endpoint
pub const MAX_SOURCE_CODE_SIZE: u64 = 64 * 1024;

/// Submission statuses
pub mod statuses {
    pub const SYNTAX: &str = "syntax";
    pub const RUNTIME: &str = "runtime";
    pub const TLE: &str = "tle";
    pub const WRONG_ANSWER: &str = "wrong_answer";
    pub const ACCEPTED: &str = "accepted";
}

// =============================================================================
// FEATURES & MODELS
// =============================================================================

/// Closed tag vocabulary, in feature-vector order
pub const TAG_VOCABULARY: [&str; 6] = ["array", "dp", "graph", "greedy", "string", "math"];

/// Placeholder success rate used for every tag
pub const DEFAULT_TAG_SUCCESS: f64 = 0.5;

/// Average solve time used when the profile has none
pub const DEFAULT_AVG_SOLVE_TIME_SECS: f64 = 100.0;

/// Average edit count used when the profile has none
pub const DEFAULT_AVG_EDITS: f64 = 3.0;

/// Length of the difficulty feature vector
pub const DIFFICULTY_FEATURE_DIM: usize = 15;

/// Length of the hint timing feature vector
pub const HINT_FEATURE_DIM: usize = 2;

/// Mean of the simulated edit count distribution
pub const SIMULATED_EDITS_MEAN: f64 = 3.0;

/// Probability above which a hint is issued
pub const HINT_THRESHOLD: f64 = 0.5;

/// Pass probability reported when no prediction row exists
pub const DEFAULT_PASS_PROBABILITY: f64 = 0.5;

/// Default difficulty model artifact
pub const DEFAULT_DIFFICULTY_MODEL_PATH: &str = "data/models/difficulty_model.json";

/// Default hint timing model artifact
pub const DEFAULT_HINT_TIMING_MODEL_PATH: &str = "data/models/hint_timing_model.json";

/// Default synthetic training data location
pub const DEFAULT_TRAINING_DATA_PATH: &str = "data/training/synthetic_data.json";

/// Synthetic observations generated when none are requested explicitly
pub const DEFAULT_SYNTHETIC_SUBMISSIONS: usize = 2000;

/// Seed for reproducible synthetic data
pub const DEFAULT_SYNTHETIC_SEED: u64 = 42;

// =============================================================================
// MENTOR / TEXT GENERATION
// =============================================================================

/// Number of problems recommended after a submission
pub const RECOMMENDATION_COUNT: usize = 3;

/// Default text generation model
pub const DEFAULT_LLM_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default text generation endpoint
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com";

/// Timeout for a single text generation request
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Token budget for hints
pub const HINT_MAX_TOKENS: u32 = 200;

/// Token budget for recommendation rationales
pub const RATIONALE_MAX_TOKENS: u32 = 100;

/// Hint length cap in characters
pub const HINT_MAX_CHARS: usize = 300;

/// Rationale length cap in characters
pub const RATIONALE_MAX_CHARS: usize = 150;

/// Fallback texts substituted when text generation fails
pub mod fallbacks {
    pub const HINT: &str =
        "Review the problem requirements carefully and trace through a simple example step-by-step.";
    pub const RATIONALE: &str = "These problems help you strengthen relevant skills.";
    pub const NO_RECOMMENDATIONS: &str = "No other unsolved problems available.";
}

// =============================================================================
// EMBEDDINGS
// =============================================================================

/// Default embedding model name
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Default remote embedding endpoint
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com";

/// Default number of similar problems returned
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// Maximum number of similar problems returned
pub const MAX_SIMILAR_LIMIT: usize = 20;

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Rate limiting configuration
pub mod rate_limits {
    /// Submit endpoint - max requests
    pub const SUBMIT_MAX_REQUESTS: i64 = 10;
    /// Submit endpoint - window in seconds
    pub const SUBMIT_WINDOW_SECS: i64 = 60;

    /// General API - max requests
    pub const GENERAL_MAX_REQUESTS: i64 = 100;
    /// General API - window in seconds
    pub const GENERAL_WINDOW_SECS: i64 = 60;
}

/// Largest request body accepted by the server
pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// API base path
pub const API_BASE_PATH: &str = "/api";
