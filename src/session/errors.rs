use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    DisplayName,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{}", join_messages(.0))]
    Validation(Vec<FieldError>),
    #[error("Invalid email or password")]
    Authentication,
    #[error("Please log in to continue")]
    NotAuthenticated,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AccountError {
    /// Field errors for a validation failure, empty for every other kind.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AccountError::Validation(errors) => errors.as_slice(),
            _ => &[],
        }
    }

    pub fn has_field_error(&self, field: Field) -> bool {
        self.field_errors().iter().any(|error| error.field == field)
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
