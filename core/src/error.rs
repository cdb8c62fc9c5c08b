use thiserror::Error;

use crate::models::{MAX_USER_ID, MIN_USER_ID};

/// Recoverable failures surfaced to the user. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("Please enter a valid User ID ({min} - {max})", min = MIN_USER_ID, max = MAX_USER_ID)]
    InvalidUserId(String),

    #[error("User ID '{0}' not found in database")]
    UserNotFound(String),

    #[error("{}", unknown_food_message(.name, .suggestions))]
    UnknownFood {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Food name must not be empty")]
    EmptyFoodName,

    #[error("No logged food at position {index} ({len} logged)")]
    FoodIndexOutOfRange { index: usize, len: usize },

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("A request is already in progress")]
    RequestInFlight,
}

fn unknown_food_message(name: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("'{name}' is not in the nutrition database")
    } else {
        format!(
            "'{name}' is not in the nutrition database. Try: {}",
            suggestions.join(", ")
        )
    }
}
