use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use chrono::Utc;
use tokio::task;

use crate::domain::user::identifier::generate_user_id;
use crate::domain::user::models::AccessToken;
use crate::domain::user::models::LoginCredentials;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::RegistrationInput;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for registration and authentication.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token signing
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

/// Run CPU-heavy password work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, UserError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| UserError::Unknown(format!("Password task failed: {}", e)))
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, input: RegistrationInput) -> Result<User, UserError> {
        let RegisterUserCommand {
            username,
            full_name,
            email,
            password,
        } = RegisterUserCommand::try_from(input).map_err(|errors| {
            tracing::debug!(errors = %errors, "Registration rejected by validation");
            UserError::from(errors)
        })?;

        let authenticator = Arc::clone(&self.authenticator);
        let password_hash =
            blocking(move || authenticator.hash_password(password.expose())).await??;

        let id = generate_user_id(self.repository.as_ref()).await?;

        let user = User {
            id,
            username,
            full_name,
            email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AccessToken, UserError> {
        let LoginCredentials { username, password } = credentials;
        let authenticator = Arc::clone(&self.authenticator);

        let Some(user) = self.repository.find_by_username(&username).await? else {
            blocking(move || authenticator.reject_unknown_user(&password)).await?;
            tracing::debug!(username = %username, "Login rejected");
            return Err(UserError::InvalidCredentials);
        };

        let claims = Claims::for_user(
            user.id,
            user.username.as_str(),
            user.full_name.as_str(),
            authenticator.token_ttl(),
        );
        let password_hash = user.password_hash;

        let result =
            blocking(move || authenticator.authenticate(&password, &password_hash, &claims))
                .await?;

        match result {
            Ok(result) => {
                tracing::info!(user_id = %user.id, "Access token issued");
                Ok(AccessToken::bearer(result.access_token))
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::debug!(username = %username, "Login rejected");
                Err(UserError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => Err(UserError::Token(e)),
        }
    }

    async fn current_user(&self, token: &str) -> Result<User, UserError> {
        let identity = self
            .authenticator
            .validate_access_token(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                UserError::InvalidToken
            })?;

        let user_id = UserId::from_string(&identity.subject).map_err(|e| {
            tracing::debug!(error = %e, "Access token subject is not a user id");
            UserError::InvalidToken
        })?;

        self.repository.find_by_id(&user_id).await?.ok_or_else(|| {
            tracing::debug!(user_id = %user_id, "Access token subject no longer exists");
            UserError::InvalidToken
        })
    }
}
