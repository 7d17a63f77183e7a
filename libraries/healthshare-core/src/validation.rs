//! Credential form validation shared by the server and the client.

use crate::error::{HealthShareError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum display name length at sign-up
pub const MIN_NAME_LEN: usize = 2;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

pub fn validate_email(email: &str) -> Result<()> {
    let valid = EMAIL_REGEX
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()));
    if valid {
        Ok(())
    } else {
        Err(HealthShareError::invalid_request("Invalid email address"))
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(HealthShareError::invalid_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(HealthShareError::invalid_request(format!(
            "Name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Sign-up form: name, email, password
pub fn validate_sign_up(name: &str, email: &str, password: &str) -> Result<()> {
    validate_display_name(name)?;
    validate_email(email)?;
    validate_password(password)
}

/// Sign-in form: email, password
pub fn validate_sign_in(email: &str, password: &str) -> Result<()> {
    validate_email(email)?;
    validate_password(password)
}
