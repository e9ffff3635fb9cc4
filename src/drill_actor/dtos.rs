use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Payload for creating a new drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_price"))]
pub struct CreateDrillRequest {
    #[validate(length(min = 2, message = "Title must be at least 2 characters"))]
    pub title: String,
    pub price_per_minute: f64,
}

impl CreateDrillRequest {
    pub fn new(title: &str, price_per_minute: f64) -> Self {
        Self {
            title: title.trim().to_string(),
            price_per_minute,
        }
    }
}

fn validate_price(request: &CreateDrillRequest) -> Result<(), ValidationError> {
    let price = request.price_per_minute;
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        let mut error = ValidationError::new("price_per_minute");
        error.message = Some("Price per minute must be a positive number".into());
        Err(error)
    }
}
