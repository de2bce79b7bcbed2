use folio_core::{AppError, AppResult, UserId};

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 12;

/// Maximum accepted password length.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Stored account used for password login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Storage identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Human-friendly name.
    pub display_name: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

/// Validates password length boundaries.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at most {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}
