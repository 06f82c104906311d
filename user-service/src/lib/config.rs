use std::env;
use std::fs;

use anyhow::bail;
use anyhow::Context;
use auth::Authenticator;
use auth::HashScheme;
use auth::JwtHandler;
use auth::PasswordHasher;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Database URL that selects the process-local store instead of PostgreSQL.
pub const IN_MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
    pub private_key_path: Option<String>,
    pub public_key_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// bcrypt cost or Argon2 iterations, scheme default when unset
    pub cost: Option<u32>,
}

fn default_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_expire_minutes() -> i64 {
    Authenticator::DEFAULT_TOKEN_TTL_MINUTES
}

fn default_scheme() -> String {
    "argon2".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            cost: None,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }

    /// Build the password hasher and token signer described by this
    /// configuration.
    pub fn authenticator(&self) -> anyhow::Result<Authenticator> {
        let scheme = HashScheme::from_name(&self.password.scheme, self.password.cost)?;

        Ok(Authenticator::with_components(
            PasswordHasher::with_scheme(scheme),
            self.jwt.handler()?,
            chrono::Duration::minutes(self.jwt.access_token_expire_minutes),
        ))
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with(IN_MEMORY_DATABASE_URL)
    }
}

impl JwtConfig {
    /// Signing keys come from the PEM files when both paths are set, the
    /// shared secret otherwise.
    pub fn handler(&self) -> anyhow::Result<JwtHandler> {
        if self.access_token_expire_minutes <= 0 {
            bail!("jwt.access_token_expire_minutes must be positive");
        }

        match (&self.private_key_path, &self.public_key_path) {
            (Some(private_path), Some(public_path)) => {
                let private_pem = fs::read(private_path)
                    .with_context(|| format!("Failed to read private key {}", private_path))?;
                let public_pem = fs::read(public_path)
                    .with_context(|| format!("Failed to read public key {}", public_path))?;

                Ok(JwtHandler::with_key_pair(
                    &self.algorithm,
                    &private_pem,
                    &public_pem,
                )?)
            }
            (None, None) => {
                if self.secret.is_empty() {
                    bail!("jwt.secret must be set");
                }
                Ok(JwtHandler::with_secret(
                    &self.algorithm,
                    self.secret.as_bytes(),
                )?)
            }
            _ => bail!("jwt.private_key_path and jwt.public_key_path must be set together"),
        }
    }
}
