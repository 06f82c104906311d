use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::user::errors::UserIdError;
use crate::user::errors::ValidationError;
use crate::user::errors::ValidationErrors;

lazy_static! {
    /// Local part, `@`, a single domain label, `.`, and a 2-3 character TLD.
    /// `\w` is spelled out as ASCII word characters.
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-z0-9]+[._]?[ a-z0-9]+@[A-Za-z0-9_]+[. ][A-Za-z0-9_]{2,3}$").unwrap();
}

/// User aggregate entity.
///
/// Represents a registered user
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub full_name: FullName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Trimmed and lowercased; 4-16 characters drawn from ASCII letters, digits,
/// `_`, `.` and `-`, with no `--` or `__` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 4;
    const MAX_LENGTH: usize = 16;

    /// Normalize and validate a raw username.
    ///
    /// Rules are checked in order: character set, doubled separators, length.
    ///
    /// # Errors
    /// * `UsernameInvalidCharacters` - Empty or contains a disallowed character
    /// * `UsernameSequencedSpecialCharacters` - Contains `--` or `__`
    /// * `UsernameLength` - Shorter than 4 or longer than 16 characters
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let username = strip(raw).to_lowercase();
        let username = Self::with_valid_chars(username)?;
        let username = Self::without_sequenced_separators(username)?;
        let username = Self::with_valid_length(username)?;
        Ok(Self(username))
    }

    fn with_valid_chars(username: String) -> Result<String, ValidationError> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');

        if !username.is_empty() && username.chars().all(allowed) {
            Ok(username)
        } else {
            Err(ValidationError::UsernameInvalidCharacters)
        }
    }

    fn without_sequenced_separators(username: String) -> Result<String, ValidationError> {
        if username.contains("--") || username.contains("__") {
            Err(ValidationError::UsernameSequencedSpecialCharacters)
        } else {
            Ok(username)
        }
    }

    fn with_valid_length(username: String) -> Result<String, ValidationError> {
        let length = username.chars().count();
        if (Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            Ok(username)
        } else {
            Err(ValidationError::UsernameLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
                actual: length,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Full name value type
///
/// Title-cased words of ASCII letters separated by spaces; at least two words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    /// Normalize and validate a raw full name.
    ///
    /// # Errors
    /// * `FullNameInvalid` - No space, or a character other than ASCII letters and spaces
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let full_name = title_case(strip(raw));

        let letters_and_spaces = full_name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ');

        if full_name.contains(' ') && letters_and_spaces {
            Ok(Self(full_name))
        } else {
            Err(ValidationError::FullNameInvalid)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trim Unicode whitespace and the ASCII information separators `\x1c`-`\x1f`.
fn strip(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
        } else {
            result.push(c);
        }
        previous_is_letter = c.is_alphabetic();
    }

    result
}

/// Email address type
///
/// Trimmed and lowercased, matched against [`EMAIL_PATTERN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize and validate a raw email address.
    ///
    /// # Errors
    /// * `EmailInvalid` - Address does not match the accepted pattern
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let email = strip(raw).to_lowercase();

        if EMAIL_PATTERN.is_match(&email) {
            Ok(Self(email))
        } else {
            Err(ValidationError::EmailInvalid)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that passed the strength rules.
///
/// Not normalized. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// Validate password strength.
    ///
    /// A single line of the password must hold a lowercase letter, an uppercase
    /// letter, a digit, a non-alphanumeric character and at least 8 characters.
    /// The line break ending a line counts as that line's non-alphanumeric
    /// character but not towards its length.
    ///
    /// # Errors
    /// * `PasswordTooWeak` - No line satisfies every rule
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        let mut lines = raw.split('\n').peekable();

        while let Some(line) = lines.next() {
            let terminated = lines.peek().is_some();
            if Self::line_is_strong(line, terminated) {
                return Ok(Self(raw));
            }
        }

        Err(ValidationError::PasswordTooWeak)
    }

    fn line_is_strong(line: &str, terminated: bool) -> bool {
        line.chars().count() >= Self::MIN_LENGTH
            && line.chars().any(|c| c.is_ascii_lowercase())
            && line.chars().any(|c| c.is_ascii_uppercase())
            && line.chars().any(|c| c.is_ascii_digit())
            && (terminated || line.chars().any(|c| !c.is_ascii_alphanumeric()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Raw registration payload, before any validation.
#[derive(Clone)]
pub struct RegistrationInput {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub username: Username,
    pub full_name: FullName,
    pub email: EmailAddress,
    pub password: Password,
}

impl TryFrom<RegistrationInput> for RegisterUserCommand {
    type Error = ValidationErrors;

    /// Validate every field independently and collect all violations.
    ///
    /// The confirmation is only compared once the password itself is valid.
    fn try_from(input: RegistrationInput) -> Result<Self, Self::Error> {
        let RegistrationInput {
            username,
            full_name,
            email,
            password,
            confirm_password,
        } = input;

        let username = Username::new(&username);
        let full_name = FullName::new(&full_name);
        let email = EmailAddress::new(&email);
        let password = Password::new(password).and_then(|password| {
            if password.expose() == confirm_password {
                Ok(password)
            } else {
                Err(ValidationError::PasswordMismatch)
            }
        });

        match (username, full_name, email, password) {
            (Ok(username), Ok(full_name), Ok(email), Ok(password)) => Ok(Self {
                username,
                full_name,
                email,
                password,
            }),
            (username, full_name, email, password) => Err(ValidationErrors::new(
                [username.err(), full_name.err(), email.err(), password.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }
}

/// Username and password presented at login, taken as submitted.
#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Bearer token handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

impl AccessToken {
    pub const BEARER: &'static str = "bearer";

    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: Self::BEARER,
        }
    }
}
