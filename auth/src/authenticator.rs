use std::sync::OnceLock;

use chrono::Duration;
use serde::Serialize;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::HashScheme;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext hashed once to give unknown-user logins a real hash to check.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing-equalisation";

/// Authentication coordinator combining password verification and JWT generation.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
    dummy_hash: OnceLock<String>,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Identity carried by a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub subject: String,
    pub username: String,
    pub full_name: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Access tokens live this long unless configured otherwise.
    pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

    /// Create an authenticator with Argon2id hashing, HS256 tokens and the
    /// default token lifetime.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_components(
            PasswordHasher::new(),
            JwtHandler::new(jwt_secret),
            Duration::minutes(Self::DEFAULT_TOKEN_TTL_MINUTES),
        )
    }

    /// Create an authenticator from explicitly configured parts.
    pub fn with_components(
        password_hasher: PasswordHasher,
        jwt_handler: JwtHandler,
        token_ttl: Duration,
    ) -> Self {
        Self {
            password_hasher,
            jwt_handler,
            token_ttl,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Scheme new password hashes are produced with.
    pub fn password_scheme(&self) -> HashScheme {
        self.password_hasher.scheme()
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Spend one hash verification on a throwaway hash.
    ///
    /// Called when a login names an unknown user so that the response takes
    /// about as long as a wrong-password response. Always rejects.
    pub fn reject_unknown_user(&self, password: &str) -> bool {
        let dummy_hash = self.dummy_hash.get_or_init(|| {
            self.password_hasher
                .hash(DUMMY_PASSWORD)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to prepare timing-equalisation hash");
                    String::new()
                })
        });

        // Result is discarded: the password may even equal the dummy one.
        let _ = self.verify_password(password, dummy_hash);
        false
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `claims` - JWT claims to encode in token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `JwtError` - Token generation failed
    pub fn authenticate<T: Serialize>(
        &self,
        password: &str,
        stored_hash: &str,
        claims: &T,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.encode(claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Generate JWT token without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode JWT token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        self.jwt_handler.decode(token)
    }

    /// Validate an access token issued by [`Claims::for_user`].
    ///
    /// # Returns
    /// Subject, username and full name carried by the token
    ///
    /// # Errors
    /// * `MissingClaim` - Token lacks `sub`, `username` or `full_name`
    /// * `JwtError` - Any other validation or decoding failure
    pub fn validate_access_token(&self, token: &str) -> Result<TokenIdentity, JwtError> {
        let claims: Claims = self.validate_token(token)?;

        let subject = claims
            .sub
            .clone()
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))?;
        let username = claims
            .username()
            .ok_or_else(|| JwtError::MissingClaim("username".to_string()))?;
        let full_name = claims
            .full_name()
            .ok_or_else(|| JwtError::MissingClaim("full_name".to_string()))?;

        Ok(TokenIdentity {
            subject,
            username,
            full_name,
        })
    }
}
