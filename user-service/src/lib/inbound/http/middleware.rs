use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_TOKEN_MESSAGE;
use crate::inbound::http::router::AppState;

/// Extension type carrying the user resolved from the bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that resolves the bearer token to a stored user and adds it to
/// request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?.to_string();

    let user = state.user_service.current_user(&token).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let invalid = || ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string());

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(invalid)?;

    let auth_str = auth_header.to_str().map_err(|_| invalid())?;

    let (scheme, token) = auth_str.split_once(' ').ok_or_else(invalid)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        tracing::debug!("Authorization header is not a bearer credential");
        return Err(invalid());
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with(authorization: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/users/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extracts_bearer_token() {
        let req = request_with(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_token_from_header(&req).unwrap(), "abc.def.ghi");

        let req = request_with(Some("bearer abc.def.ghi"));
        assert_eq!(extract_token_from_header(&req).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        let req = request_with(None);
        assert_eq!(
            extract_token_from_header(&req).unwrap_err(),
            ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_rejects_other_schemes_and_empty_tokens() {
        for value in ["Basic YWI6Y2Q=", "Bearer", "Bearer   ", "abc.def.ghi"] {
            let req = request_with(Some(value));
            assert_eq!(
                extract_token_from_header(&req).unwrap_err(),
                ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()),
                "{} accepted",
                value
            );
        }
    }
}
