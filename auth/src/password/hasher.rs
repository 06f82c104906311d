use std::fmt;

use super::argon2 as argon2_scheme;
use super::bcrypt as bcrypt_scheme;
use super::errors::PasswordError;

/// Adaptive hashing scheme used for new password hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// Argon2id; `iterations` is the time cost.
    Argon2id { iterations: u32 },
    /// bcrypt; `cost` is the log2 round count.
    Bcrypt { cost: u32 },
}

impl HashScheme {
    /// Resolve a scheme from its configuration name.
    ///
    /// # Arguments
    /// * `name` - `argon2`, `argon2id` or `bcrypt` (case-insensitive)
    /// * `cost` - Optional work factor, scheme default when `None`
    ///
    /// # Errors
    /// * `UnsupportedScheme` - Unknown scheme name
    pub fn from_name(name: &str, cost: Option<u32>) -> Result<Self, PasswordError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(Self::Argon2id {
                iterations: cost.unwrap_or(argon2_scheme::DEFAULT_ITERATIONS),
            }),
            "bcrypt" => Ok(Self::Bcrypt {
                cost: cost.unwrap_or(bcrypt_scheme::DEFAULT_COST),
            }),
            other => Err(PasswordError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl Default for HashScheme {
    fn default() -> Self {
        Self::Argon2id {
            iterations: argon2_scheme::DEFAULT_ITERATIONS,
        }
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argon2id { iterations } => write!(f, "argon2id(t={})", iterations),
            Self::Bcrypt { cost } => write!(f, "bcrypt(cost={})", cost),
        }
    }
}

/// Password hashing implementation.
///
/// New hashes use the configured scheme. Verification dispatches on the
/// stored hash's own prefix, so Argon2 and bcrypt records both verify
/// whatever scheme is currently configured.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    scheme: HashScheme,
}

impl PasswordHasher {
    /// Create a hasher using Argon2id with default parameters.
    pub fn new() -> Self {
        Self::with_scheme(HashScheme::default())
    }

    /// Create a hasher for an explicit scheme.
    pub fn with_scheme(scheme: HashScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> HashScheme {
        self.scheme
    }

    /// Hash a plaintext password with a random salt.
    ///
    /// # Returns
    /// Self-describing hash string (algorithm, cost and salt embedded)
    ///
    /// # Errors
    /// * `InvalidCost` - Configured work factor is out of range
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        match self.scheme {
            HashScheme::Argon2id { iterations } => argon2_scheme::hash(password, iterations),
            HashScheme::Bcrypt { cost } => bcrypt_scheme::hash(password, cost),
        }
    }

    /// Verify a password against a stored hash.
    ///
    /// Never fails: an unrecognised or malformed hash verifies as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let outcome = if hash.starts_with(argon2_scheme::PREFIX) {
            argon2_scheme::verify(password, hash)
        } else if bcrypt_scheme::is_bcrypt_hash(hash) {
            bcrypt_scheme::verify(password, hash)
        } else {
            Err(PasswordError::VerificationFailed(
                "Unrecognised password hash format".to_string(),
            ))
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
