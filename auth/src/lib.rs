//! Authentication utilities library
//!
//! Provides the credential primitives used by the user service:
//! - Password hashing (Argon2id, with bcrypt as an alternative scheme)
//! - JWT token generation and validation
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::with_secret("HS256", b"secret_key_at_least_32_bytes_long!").unwrap();
//! let claims = Claims::for_user("user123", "alice", "Alice Smith", Duration::minutes(15));
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.username().as_deref(), Some("alice"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Claims};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("Password1!").unwrap();
//!
//! // Login: verify and generate token
//! let claims = Claims::for_user("user123", "alice", "Alice Smith", auth.token_ttl());
//! let result = auth.authenticate("Password1!", &hash, &claims).unwrap();
//!
//! // Validate token
//! let identity = auth.validate_access_token(&result.access_token).unwrap();
//! assert_eq!(identity.subject, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::TokenIdentity;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::HashScheme;
pub use password::PasswordError;
pub use password::PasswordHasher;
