//! Input validation helpers.

use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Basic email shape check: a non-empty local part, `@`, and a domain
/// containing a dot.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Checks that `value` has between `min` and `max` characters.
pub fn require_length(field: &str, value: &str, min: usize, max: usize) -> ServerResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(if min <= 1 {
            ServerError::InvalidRequest(format!("{field} is required"))
        } else {
            ServerError::InvalidRequest(format!("{field} must be at least {min} characters"))
        });
    }
    if len > max {
        return Err(ServerError::InvalidRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Checks that `value` has at most `max` characters.
pub fn max_length(field: &str, value: &str, max: usize) -> ServerResult<()> {
    require_length(field, value, 0, max)
}

/// Parses a record ID taken from the request path.
pub fn parse_id(entity: &str, raw: &str) -> ServerResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServerError::InvalidRequest(format!("Invalid {entity} ID: {raw}")))
}
