//! Mentor request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::MAX_SOURCE_CODE_SIZE;

/// Submit solution request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitSolutionRequest {
    pub user_id: Uuid,

    pub problem_id: Uuid,

    /// Python source
    #[validate(length(min = 1, max = MAX_SOURCE_CODE_SIZE))]
    pub code: String,

    /// Seconds the user spent on this attempt
    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_spent_seconds: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> SubmitSolutionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_time_defaults_to_zero() {
        let req = request(json!({
            "user_id": Uuid::new_v4(),
            "problem_id": Uuid::new_v4(),
            "code": "print(1)"
        }));
        assert_eq!(req.time_spent_seconds, 0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_code_and_negative_time() {
        let req = request(json!({
            "user_id": Uuid::new_v4(),
            "problem_id": Uuid::new_v4(),
            "code": "",
            "time_spent_seconds": -5
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("code"));
        assert!(fields.contains_key("time_spent_seconds"));
    }
}
