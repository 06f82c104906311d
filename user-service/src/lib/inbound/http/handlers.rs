use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::Field;
use crate::user::errors::UserError;
use crate::user::errors::ValidationErrors;

pub mod current_user;
pub mod login;
pub mod register;

/// Message returned for every rejected token, whatever the cause.
pub const INVALID_TOKEN_MESSAGE: &str = "Could not validate credentials";

/// Message returned for every rejected login, whatever the cause.
pub const INVALID_LOGIN_MESSAGE: &str = "Incorrect username or password";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(ApiErrorData),
    Unauthorized(String),
}

impl ApiError {
    pub fn field(field: Field, message: impl Into<String>) -> Self {
        ApiError::BadRequest(ApiErrorData {
            error: message.into(),
            field: Some(field.as_str().to_string()),
            errors: Vec::new(),
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorData::message("Internal server error")),
                )
                    .into_response()
            }
            ApiError::BadRequest(data) => (StatusCode::BAD_REQUEST, Json(data)).into_response(),
            ApiError::Unauthorized(msg) => {
                let mut response =
                    (StatusCode::UNAUTHORIZED, Json(ApiErrorData::message(msg))).into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let (error, field) = match errors.first() {
            Some(first) => (first.to_string(), Some(first.field().as_str().to_string())),
            None => ("invalid registration".to_string(), None),
        };

        ApiError::BadRequest(ApiErrorData {
            error,
            field,
            errors: errors
                .iter()
                .map(|e| FieldErrorData {
                    field: e.field().as_str().to_string(),
                    error: e.to_string(),
                })
                .collect(),
        })
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => errors.into(),
            UserError::UsernameAlreadyExists(_) => ApiError::field(Field::Username, err.to_string()),
            UserError::EmailAlreadyExists(_) => ApiError::field(Field::Email, err.to_string()),
            UserError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_LOGIN_MESSAGE.to_string())
            }
            UserError::InvalidToken => {
                ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
            }
            UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorData>,
}

impl ApiErrorData {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldErrorData {
    pub field: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::errors::ValidationError;

    #[test]
    fn test_validation_errors_keep_every_field() {
        let errors = ValidationErrors::new(vec![
            ValidationError::EmailInvalid,
            ValidationError::PasswordMismatch,
        ]);

        let ApiError::BadRequest(data) = ApiError::from(UserError::Validation(errors)) else {
            panic!("Expected bad request");
        };

        assert_eq!(data.error, "email is invalid");
        assert_eq!(data.field.as_deref(), Some("email"));
        assert_eq!(data.errors.len(), 2);
        assert_eq!(data.errors[1].field, "confirm_password");
    }

    #[test]
    fn test_uniqueness_names_field() {
        let error = ApiError::from(UserError::EmailAlreadyExists("ab.cd@example.com".into()));
        assert_eq!(
            error,
            ApiError::field(Field::Email, "Email already exists: ab.cd@example.com")
        );
    }

    #[test]
    fn test_authentication_failures_are_generic() {
        assert_eq!(
            ApiError::from(UserError::InvalidCredentials),
            ApiError::Unauthorized(INVALID_LOGIN_MESSAGE.to_string())
        );
        assert_eq!(
            ApiError::from(UserError::InvalidToken),
            ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_unauthorized_response_challenges_bearer() {
        let response = ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response =
            ApiError::from(UserError::DatabaseError("password=secret".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
