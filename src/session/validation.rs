use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::{Field, FieldError};

pub const MIN_DISPLAY_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Sign-up form input as the capture surface submits it.
#[derive(Debug, Clone)]
pub struct Registration {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Field-level checks that need no storage access. The duplicate-email check
/// happens at insert time.
pub fn validate_registration(form: &Registration) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.display_name.trim().chars().count() < MIN_DISPLAY_NAME_LEN {
        errors.push(FieldError::new(
            Field::DisplayName,
            format!("Name must be at least {MIN_DISPLAY_NAME_LEN} characters"),
        ));
    }

    if !is_valid_email(&normalize_email(&form.email)) {
        errors.push(FieldError::new(Field::Email, "Enter a valid email address"));
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            Field::Password,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    if form.password != form.confirm_password {
        errors.push(FieldError::new(Field::ConfirmPassword, "Passwords do not match"));
    }

    errors
}
