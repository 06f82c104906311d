mod common;

use auth::Claims;
use chrono::Utc;
use common::registration;
use common::TestApp;
use reqwest::header::WWW_AUTHENTICATE;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .register(&json!({
            "username": "ab_cd",
            "full_name": "Ab Cd",
            "email": "ab.cd@example.com",
            "password": "Abcdef1!",
            "confirm_password": "Abcdef1!"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_str().expect("Missing id");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = TestApp::spawn().await;

    let mut body = registration("ab_cd", "ab.cd@example.com");
    body["confirm_password"] = json!("Abcdef1?");

    let response = app.register(&body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "confirm_password");
    assert_eq!(body["error"], "passwords do not match");

    // Nothing was stored, so the username is still free
    let response = app.register(&registration("ab_cd", "ab.cd@example.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_lists_every_invalid_field() {
    let app = TestApp::spawn().await;

    let response = app
        .register(&json!({
            "username": "a__b",
            "full_name": "Nobody",
            "email": "not-an-email",
            "password": "weak",
            "confirm_password": "weak"
        }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "username");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("Missing errors")
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["username", "full_name", "email", "password"]);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;

    app.register(&registration("ab_cd", "ab.cd@example.com")).await;

    // Usernames are normalized before the uniqueness check
    let response = app
        .register(&registration(" AB_CD ", "other@example.com"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "username");
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register(&registration("ab_cd", "ab.cd@example.com")).await;

    let response = app
        .register(&registration("other", "ab.cd@example.com"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "email");
    assert!(body["error"].as_str().unwrap().contains("already"));
}

#[tokio::test]
async fn test_register_malformed_body() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/register")
        .json(&json!({ "username": "ab_cd" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .register(&registration("ab_cd", "ab.cd@example.com"))
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let user_id = body["id"].as_str().unwrap().to_string();

    let response = app.login("ab_cd", "Abcdef1!").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "bearer");

    let token = body["access_token"].as_str().expect("Missing token");
    let claims: Claims = app.jwt_handler.decode(token).expect("Invalid token");
    assert_eq!(claims.sub, Some(user_id));
    assert_eq!(claims.username().as_deref(), Some("ab_cd"));
    assert_eq!(claims.full_name().as_deref(), Some("Ab Cd"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;

    app.register(&registration("ab_cd", "ab.cd@example.com")).await;

    let response = app.login("ab_cd", "Abcdef1?").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Incorrect username or password");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::spawn().await;

    app.register(&registration("ab_cd", "ab.cd@example.com")).await;

    let unknown = app.login("nobody", "Abcdef1!").await;
    let wrong = app.login("ab_cd", "Abcdef1?").await;

    assert_eq!(unknown.status(), wrong.status());
    let unknown: Value = unknown.json().await.unwrap();
    let wrong: Value = wrong.json().await.unwrap();
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn test_current_user() {
    let app = TestApp::spawn().await;

    app.register(&registration("ab_cd", "ab.cd@example.com")).await;
    let token = app.access_token("ab_cd", "Abcdef1!").await;

    for path in ["/users/me", "/users/me/"] {
        let response = app
            .get_authenticated(path, &token)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(
            body,
            json!({
                "username": "ab_cd",
                "email": "ab.cd@example.com",
                "full_name": "Ab Cd"
            })
        );
    }
}

#[tokio::test]
async fn test_current_user_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/users/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_current_user_expired_token() {
    let app = TestApp::spawn().await;

    let body: Value = app
        .register(&registration("ab_cd", "ab.cd@example.com"))
        .await
        .json()
        .await
        .unwrap();
    let user_id = body["id"].as_str().unwrap();

    let now = Utc::now().timestamp();
    let claims = Claims::new()
        .with_subject(user_id)
        .with_issued_at(now - 3600)
        .with_expiration(now - 60)
        .with_extra("username", "ab_cd")
        .with_extra("full_name", "Ab Cd");
    let token = app.jwt_handler.encode(&claims).unwrap();

    let response = app
        .get_authenticated("/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_current_user_unknown_subject() {
    let app = TestApp::spawn().await;

    let claims = Claims::for_user(
        uuid::Uuid::new_v4(),
        "ghost",
        "Gh Ost",
        chrono::Duration::minutes(15),
    );
    let token = app.jwt_handler.encode(&claims).unwrap();

    let response = app
        .get_authenticated("/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn test_current_user_token_signed_with_other_key() {
    let app = TestApp::spawn().await;

    app.register(&registration("ab_cd", "ab.cd@example.com")).await;
    let token = app.access_token("ab_cd", "Abcdef1!").await;

    let forged = auth::JwtHandler::new(b"some-other-secret")
        .encode(&app.jwt_handler.decode::<Claims>(&token).unwrap())
        .unwrap();

    let response = app
        .get_authenticated("/users/me", &forged)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/health")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}
