pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use std::collections::BTreeMap;

use crate::error::AppError;

/// Collapse per-field form errors into one validation error.
pub fn validation_error(errors: BTreeMap<&'static str, String>) -> AppError {
    let detail = errors
        .into_iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ");
    AppError::Validation(detail)
}
