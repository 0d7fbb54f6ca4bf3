//! Rate limiting middleware
//!
//! Fixed-window counters in Redis keyed by client IP and endpoint bucket. The
//! window's expiry is created together with the counter in one transaction, so
//! a counter never outlives its window. When Redis is unreachable requests are
//! let through.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    constants::{API_BASE_PATH, rate_limits},
    error::AppError,
    state::AppState,
};

/// Endpoint group sharing one counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Submit,
    General,
}

impl Bucket {
    fn for_path(path: &str) -> Self {
        let submit = format!("{}/mentor/submit", API_BASE_PATH);
        if path.starts_with(&submit) {
            Self::Submit
        } else {
            Self::General
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::General => "general",
        }
    }

    /// (max requests, window seconds)
    fn limit(self) -> (i64, i64) {
        match self {
            Self::Submit => (
                rate_limits::SUBMIT_MAX_REQUESTS,
                rate_limits::SUBMIT_WINDOW_SECS,
            ),
            Self::General => (
                rate_limits::GENERAL_MAX_REQUESTS,
                rate_limits::GENERAL_WINDOW_SECS,
            ),
        }
    }
}

/// Open the window for `key` if needed, then count one request
///
/// `SET NX EX` leaves a running window untouched; `INCR` keeps its TTL.
fn window_counter(key: &str, window: i64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("NX")
        .arg("EX")
        .arg(window)
        .ignore()
        .incr(key, 1);
    pipe
}

/// Rate limit middleware
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bucket = Bucket::for_path(request.uri().path());
    let (limit, window) = bucket.limit();
    let key = format!("rate_limit:{}:{}", addr.ip(), bucket.name());

    let mut redis = state.redis();
    let count = match window_counter(&key, window)
        .query_async::<(i64,)>(&mut redis)
        .await
    {
        Ok((count,)) => count,
        Err(e) => {
            tracing::warn!(error = %e, "Rate limiter unavailable, allowing request");
            return Ok(next.run(request).await);
        }
    };

    if count > limit {
        tracing::debug!(ip = %addr.ip(), bucket = bucket.name(), count, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_paths_share_bucket() {
        assert_eq!(Bucket::for_path("/api/mentor/submit"), Bucket::Submit);
        assert_eq!(Bucket::for_path("/api/mentor/submit/"), Bucket::Submit);
        assert_eq!(
            Bucket::for_path("/api/user/00000000-0000-0000-0000-000000000000/difficulty-predictions"),
            Bucket::General
        );
        assert_eq!(Bucket::for_path("/api/health"), Bucket::General);
    }

    #[test]
    fn test_window_counter_sets_expiry_with_increment() {
        let packed = window_counter("rate_limit:127.0.0.1:submit", 60).get_packed_pipeline();
        let packed = String::from_utf8(packed).unwrap();

        let multi = packed.find("MULTI").unwrap();
        let set = packed.find("SET").unwrap();
        let incr = packed.find("INCR").unwrap();
        let exec = packed.find("EXEC").unwrap();
        assert!(multi < set && set < incr && incr < exec);
        assert!(packed.contains("$2\r\nNX\r\n$2\r\nEX\r\n$2\r\n60\r\n"));
        assert!(!packed.contains("EXPIRE"));
    }

    #[test]
    fn test_submit_bucket_is_stricter() {
        assert!(Bucket::Submit.limit().0 < Bucket::General.limit().0);
    }
}
