use std::str::FromStr;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow services to define their own token payload.
/// HMAC algorithms sign with a shared secret; RSA, ECDSA and EdDSA algorithms
/// sign with a PEM private key and verify with the matching public key.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new HS256 handler with a secret key.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Create a handler for an HMAC algorithm selected by name.
    ///
    /// # Arguments
    /// * `algorithm` - `HS256`, `HS384` or `HS512`
    /// * `secret` - Shared signing secret
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Unknown name or not an HMAC algorithm
    pub fn with_secret(algorithm: &str, secret: &[u8]) -> Result<Self, JwtError> {
        let algorithm = parse_algorithm(algorithm)?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(Self {
                encoding_key: EncodingKey::from_secret(secret),
                decoding_key: DecodingKey::from_secret(secret),
                algorithm,
            }),
            other => Err(JwtError::UnsupportedAlgorithm(format!(
                "{:?} requires a key pair, not a shared secret",
                other
            ))),
        }
    }

    /// Create a handler for an asymmetric algorithm selected by name.
    ///
    /// # Arguments
    /// * `algorithm` - `RS*`, `PS*`, `ES256`, `ES384` or `EdDSA`
    /// * `private_pem` - PEM encoded signing key
    /// * `public_pem` - PEM encoded verification key
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Unknown name or an HMAC algorithm
    /// * `InvalidKey` - A PEM key could not be parsed for the algorithm
    pub fn with_key_pair(
        algorithm: &str,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, JwtError> {
        let algorithm = parse_algorithm(algorithm)?;
        let invalid_key = |e: jsonwebtoken::errors::Error| JwtError::InvalidKey(e.to_string());

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => (
                EncodingKey::from_rsa_pem(private_pem).map_err(invalid_key)?,
                DecodingKey::from_rsa_pem(public_pem).map_err(invalid_key)?,
            ),
            Algorithm::ES256 | Algorithm::ES384 => (
                EncodingKey::from_ec_pem(private_pem).map_err(invalid_key)?,
                DecodingKey::from_ec_pem(public_pem).map_err(invalid_key)?,
            ),
            Algorithm::EdDSA => (
                EncodingKey::from_ed_pem(private_pem).map_err(invalid_key)?,
                DecodingKey::from_ed_pem(public_pem).map_err(invalid_key)?,
            ),
            other => {
                return Err(JwtError::UnsupportedAlgorithm(format!(
                    "{:?} uses a shared secret, not a key pair",
                    other
                )))
            }
        };

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// The token must be signed with the configured algorithm and carry
    /// `exp` and `sub` claims. Expiry is checked with zero leeway.
    ///
    /// # Errors
    /// * `TokenExpired` - Token `exp` is in the past
    /// * `MissingClaim` - `exp` or `sub` absent
    /// * `InvalidToken` - Signature or algorithm mismatch
    /// * `DecodingFailed` - Token is malformed
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidToken(e.to_string())
                }
                _ => JwtError::DecodingFailed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, JwtError> {
    Algorithm::from_str(name.trim()).map_err(|_| JwtError::UnsupportedAlgorithm(name.to_string()))
}
