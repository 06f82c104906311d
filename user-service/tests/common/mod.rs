use std::sync::Arc;

use auth::Authenticator;
use auth::HashScheme;
use auth::JwtHandler;
use auth::PasswordHasher;
use serde_json::json;
use serde_json::Value;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let user_repo = Arc::new(InMemoryUserRepository::new());

        // Lowest bcrypt cost keeps the suite fast
        let authenticator = Arc::new(Authenticator::with_components(
            PasswordHasher::with_scheme(HashScheme::Bcrypt { cost: 4 }),
            JwtHandler::new(JWT_SECRET),
            chrono::Duration::minutes(15),
        ));

        let user_service = Arc::new(UserService::new(user_repo, authenticator));
        let router = create_router(user_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and return the response
    pub async fn register(&self, body: &Value) -> reqwest::Response {
        self.post("/register")
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in with known-good credentials and return the access token
    pub async fn access_token(&self, username: &str, password: &str) -> String {
        let body: Value = self
            .login(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");

        body["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}

/// A registration body that passes every validation rule
pub fn registration(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "full_name": "ab cd",
        "email": email,
        "password": "Abcdef1!",
        "confirm_password": "Abcdef1!"
    })
}
