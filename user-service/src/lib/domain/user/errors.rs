use std::fmt;

use thiserror::Error;

/// Registration input field a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    /// Wire name of the field, as it appears in request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single registration rule violation.
///
/// Each variant names the broken rule; [`ValidationError::field`] names the
/// input field it belongs to.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username is invalid")]
    UsernameInvalidCharacters,

    #[error("username must not contain sequenced special characters")]
    UsernameSequencedSpecialCharacters,

    #[error("username length must be between {min} and {max} characters, got {actual}")]
    UsernameLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("full name must have a space and only alpha characters")]
    FullNameInvalid,

    #[error("email is invalid")]
    EmailInvalid,

    #[error("password does not meet the criteria")]
    PasswordTooWeak,

    #[error("passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::UsernameInvalidCharacters
            | ValidationError::UsernameSequencedSpecialCharacters
            | ValidationError::UsernameLength { .. } => Field::Username,
            ValidationError::FullNameInvalid => Field::FullName,
            ValidationError::EmailInvalid => Field::Email,
            ValidationError::PasswordTooWeak => Field::Password,
            ValidationError::PasswordMismatch => Field::ConfirmPassword,
        }
    }
}

/// Every rule violation found in one registration input, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    /// The violation reported as the headline error.
    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field(), error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Invalid registration: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(auth::JwtError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        UserError::Unknown(err.to_string())
    }
}
