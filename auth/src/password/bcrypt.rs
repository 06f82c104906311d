use super::errors::PasswordError;

/// Modular-crypt prefixes produced by bcrypt implementations.
pub const PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Default bcrypt cost (log2 of the number of rounds).
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a password with bcrypt at the given cost.
///
/// # Errors
/// * `InvalidCost` - Cost outside the 4..=31 range
/// * `HashingFailed` - Password hashing operation failed
pub fn hash(password: &str, cost: u32) -> Result<String, PasswordError> {
    if !(4..=31).contains(&cost) {
        return Err(PasswordError::InvalidCost(format!(
            "bcrypt cost must be between 4 and 31, got {}",
            cost
        )));
    }

    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verify a password against a bcrypt hash.
///
/// # Errors
/// * `VerificationFailed` - Hash is not a valid bcrypt string
pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(|e| {
        PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
    })
}

/// Whether a stored hash carries a bcrypt prefix.
pub fn is_bcrypt_hash(hash: &str) -> bool {
    PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}
