use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Payload for creating a new user. Build it with [`CreateUserRequest::new`]
/// so names and email are trimmed before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be 2 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "Last name must be 2 to 50 characters"))]
    pub last_name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub fn new(first_name: &str, last_name: &str, email: Option<&str>) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        }
    }
}
