//! Registration rules and password hashing.

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use fintrack_shared::ValidationErrors;
use fintrack_shared::auth::RegisterRequest;

/// Maximum display name length in characters.
pub const MAX_NAME_LEN: usize = 50;
/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Maximum email length.
pub const MAX_EMAIL_LEN: usize = 254;

/// A registration that passed validation. The email is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Trimmed display name.
    pub name: String,
    /// Lower-cased email.
    pub email: String,
    /// Plaintext password, to be hashed by the caller.
    pub password: String,
}

/// Trims and lower-cases an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Validates a registration request.
///
/// # Errors
///
/// Returns every invalid field.
pub fn validate_registration(request: &RegisterRequest) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = request.name.trim();
    if name.is_empty() {
        errors.push("name", "Name is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push("name", format!("Name cannot exceed {MAX_NAME_LEN} characters"));
    }

    let email = normalize_email(&request.email);
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !is_valid_email(&email) {
        errors.push("email", "Please enter a valid email");
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    errors.into_result(Registration {
        name: name.to_string(),
        email,
        password: request.password.clone(),
    })
}
