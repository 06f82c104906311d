use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// PHC identifier prefix shared by every Argon2 variant.
pub const PREFIX: &str = "$argon2";

/// Default number of Argon2id passes.
pub const DEFAULT_ITERATIONS: u32 = Params::DEFAULT_T_COST;

/// Hash a password with Argon2id and a fresh random salt.
///
/// Memory and parallelism use the crate defaults; `iterations` is the
/// tunable work factor.
///
/// # Returns
/// PHC string format hash (includes algorithm, parameters, salt, and hash)
///
/// # Errors
/// * `InvalidCost` - Iteration count rejected by Argon2
/// * `HashingFailed` - Password hashing operation failed
pub fn hash(password: &str, iterations: u32) -> Result<String, PasswordError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        iterations,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|e| PasswordError::InvalidCost(e.to_string()))?;

    let salt = SaltString::generate(&mut OsRng);

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verify a password against an Argon2 PHC string.
///
/// Parameters are read from the hash itself.
///
/// # Errors
/// * `VerificationFailed` - Hash is not a valid PHC string
pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc_string() {
        let hash = hash("Abcdef1!", 1).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("t=1"));
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let hash = hash("Abcdef1!", 3).expect("Failed to hash password");

        assert!(verify("Abcdef1!", &hash).expect("Failed to verify password"));
        assert!(!verify("Abcdef1?", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = hash("Abcdef1!", 0);
        assert!(matches!(result, Err(PasswordError::InvalidCost(_))));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let result = verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_verify_malformed_argon2_hash_never_matches() {
        let result = verify("password", "$argon2id$garbage");
        assert!(!matches!(result, Ok(true)));
    }
}
