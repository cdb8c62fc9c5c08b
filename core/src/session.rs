use crate::error::DashboardError;
use crate::models::{MAX_USER_ID, MIN_USER_ID, UserProfile};
use crate::users::UserDirectory;

/// Accept only a whole number in the demo id range.
pub fn validate_user_id(input: &str) -> Result<i64, DashboardError> {
    let raw = input.trim();
    match raw.parse::<i64>() {
        Ok(id) if (MIN_USER_ID..=MAX_USER_ID).contains(&id) => Ok(id),
        _ => Err(DashboardError::InvalidUserId(raw.to_string())),
    }
}

/// Range check first, then directory membership.
pub fn login(input: &str, users: &UserDirectory) -> Result<UserProfile, DashboardError> {
    let id = validate_user_id(input)?.to_string();
    users
        .get(&id)
        .cloned()
        .ok_or(DashboardError::UserNotFound(id))
}
