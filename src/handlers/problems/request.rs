//! Problem request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{DEFAULT_SIMILAR_LIMIT, MAX_SIMILAR_LIMIT};

/// Query parameters for the similarity search
#[derive(Debug, Deserialize, Validate)]
pub struct SimilarProblemsQuery {
    #[validate(range(min = 1, max = MAX_SIMILAR_LIMIT))]
    pub limit: Option<usize>,
}

impl SimilarProblemsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT)
    }
}
