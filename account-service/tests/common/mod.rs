use std::sync::Arc;

use account_service::domain::user::models::Cpf;
use account_service::domain::user::models::PlainPassword;
use account_service::domain::user::models::User;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use auth::Authenticator;
use auth::HashCost;
use auth::PasswordHasher;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ADMIN_CPF: &str = "52998224725";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: InMemoryUserRepository,
    pub api_client: reqwest::Client,
    pub authenticator: Authenticator,
    pub admin: User,
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

        let repository = InMemoryUserRepository::new();

        // Cheapest Argon2 parameters keep the suite fast
        let password_hasher = PasswordHasher::with_cost(HashCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let user_service = Arc::new(UserService::new(
            Arc::new(repository.clone()),
            password_hasher,
        ));

        let admin = user_service
            .ensure_admin(
                Cpf::new(ADMIN_CPF.to_string()).unwrap(),
                PlainPassword::new(ADMIN_PASSWORD.to_string()).unwrap(),
            )
            .await
            .expect("Failed to seed admin")
            .expect("Admin already present in a fresh store");

        let router = create_router(user_service, Arc::new(Authenticator::new(JWT_SECRET)));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            api_client: reqwest::Client::new(),
            authenticator: Authenticator::new(JWT_SECRET),
            admin,
        }
    }

    /// Token for the seeded admin, minted directly
    pub fn admin_token(&self) -> String {
        self.authenticator
            .issue_token(self.admin.id)
            .expect("Failed to issue admin token")
    }

    /// Log in through the API and return the token
    pub async fn login(&self, cpf: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/login")
            .json(&json!({ "cpf": cpf, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register a user as the admin and return the response body
    pub async fn register(&self, body: &Value) -> Value {
        let response = self
            .post_authenticated("/api/auth/register", &self.admin_token())
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        response.json().await.expect("Failed to parse response")
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}

/// A valid registration body for the given CPF
pub fn registration_body(cpf: &str, name: &str) -> Value {
    json!({
        "name": name,
        "cpf": cpf,
        "birthdate": "1990-05-17",
        "password": "user-password",
        "address": {
            "street": "Rua das Flores",
            "number": "42",
            "complement": "Apto 101",
            "neighborhood": "Centro Historico",
            "city": "Sao Paulo",
            "state": "Sao Paulo",
            "zipCode": "01001000"
        }
    })
}
