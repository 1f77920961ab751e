mod common;

use auth::Authenticator;
use common::registration_body;
use common::TestApp;
use common::ADMIN_CPF;
use common::ADMIN_PASSWORD;
use common::JWT_SECRET;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(fields) => fields
            .iter()
            .any(|(k, v)| k == key || contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}

// ===== Login =====

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "cpf": ADMIN_CPF, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().unwrap();
    assert_eq!(
        app.authenticator.verify_token(token).unwrap(),
        app.admin.id.to_string()
    );
}

#[tokio::test]
async fn test_login_accepts_formatted_cpf() {
    let app = TestApp::spawn().await;

    let token = app.login("529.982.247-25", ADMIN_PASSWORD).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let app = TestApp::spawn().await;

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({ "cpf": ADMIN_CPF, "password": "not-the-password" }))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown_cpf = app
        .post("/api/auth/login")
        .json(&json!({ "cpf": "11144477735", "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");
    let malformed_cpf = app
        .post("/api/auth/login")
        .json(&json!({ "cpf": "123", "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_cpf.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(malformed_cpf.status(), StatusCode::UNAUTHORIZED);

    let wrong_password = wrong_password.bytes().await.unwrap();
    let unknown_cpf = unknown_cpf.bytes().await.unwrap();
    let malformed_cpf = malformed_cpf.bytes().await.unwrap();
    assert_eq!(wrong_password, unknown_cpf);
    assert_eq!(unknown_cpf, malformed_cpf);
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "cpf": ADMIN_CPF }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("password"));
}

// ===== Authentication =====

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/api/users", "not.a.token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_protected_route_with_wrong_scheme() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users")
        .header("Authorization", format!("Basic {}", app.admin_token()))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_protected_route_with_expired_token() {
    let app = TestApp::spawn().await;

    let expired = Authenticator::new(JWT_SECRET)
        .with_token_ttl(chrono::Duration::seconds(-60))
        .issue_token(app.admin.id)
        .unwrap();

    let response = app
        .get_authenticated("/api/users", &expired)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_protected_route_with_foreign_signature() {
    let app = TestApp::spawn().await;

    let forged = Authenticator::new(b"some-other-secret-entirely-32-bytes!")
        .issue_token(app.admin.id)
        .unwrap();

    let response = app
        .get_authenticated("/api/users", &forged)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ===== Register =====

#[tokio::test]
async fn test_register_user_success() {
    let app = TestApp::spawn().await;

    let body = app
        .register(&registration_body("111.444.777-35", "Maria Silva"))
        .await;

    assert!(body["id"].is_string());
    assert_eq!(body["cpf"], "11144477735");
    assert_eq!(body["name"], "Maria Silva");
    assert_eq!(body["status"], "Active");
    assert_eq!(body["createdBy"], "Admin");
    assert_eq!(body["address"]["zipCode"], "01001000");
    assert!(body["createdAt"].is_string());
    assert!(!contains_key(&body, "password"));
    assert!(!contains_key(&body, "removedAt"));
    assert!(!contains_key(&body, "updatedBy"));
}

#[tokio::test]
async fn test_registered_user_can_log_in() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;

    let token = app.login("11144477735", "user-password").await;

    assert_eq!(
        app.authenticator.verify_token(&token).unwrap(),
        created["id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn test_register_user_invalid_fields() {
    let app = TestApp::spawn().await;

    let mut body = registration_body("11144477735", "Maria Silva");
    body["password"] = json!("short");

    let response = app
        .post_authenticated("/api/auth/register", &app.admin_token())
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.repository.count().await, 1);
}

#[tokio::test]
async fn test_register_user_missing_address() {
    let app = TestApp::spawn().await;

    let mut body = registration_body("11144477735", "Maria Silva");
    body.as_object_mut().unwrap().remove("address");

    let response = app
        .post_authenticated("/api/auth/register", &app.admin_token())
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("address"));
    assert_eq!(app.repository.count().await, 1);
}

#[tokio::test]
async fn test_register_user_wrong_json_type() {
    let app = TestApp::spawn().await;

    let mut body = registration_body("11144477735", "Maria Silva");
    body["cpf"] = json!(11144477735_u64);

    let response = app
        .post_authenticated("/api/auth/register", &app.admin_token())
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_register_user_unparseable_body() {
    let app = TestApp::spawn().await;

    let response = app
        .post_authenticated("/api/auth/register", &app.admin_token())
        .header("Content-Type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_register_user_duplicate_cpf() {
    let app = TestApp::spawn().await;
    app.register(&registration_body("11144477735", "Maria Silva"))
        .await;

    let response = app
        .post_authenticated("/api/auth/register", &app.admin_token())
        .json(&registration_body("111.444.777-35", "Outra Pessoa"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_register_with_unknown_actor() {
    let app = TestApp::spawn().await;

    let ghost = app
        .authenticator
        .issue_token(uuid::Uuid::new_v4())
        .unwrap();

    let response = app
        .post_authenticated("/api/auth/register", &ghost)
        .json(&registration_body("11144477735", "Maria Silva"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.repository.count().await, 1);
}

// ===== Get / List =====

#[tokio::test]
async fn test_get_user_success() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;

    let response = app
        .get_authenticated(
            &format!("/api/users/{}", created["id"].as_str().unwrap()),
            &app.admin_token(),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated(
            &format!("/api/users/{}", uuid::Uuid::new_v4()),
            &app.admin_token(),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_invalid_id() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/api/users/not-a-uuid", &app.admin_token())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users() {
    let app = TestApp::spawn().await;
    app.register(&registration_body("11144477735", "Maria Silva"))
        .await;
    app.register(&registration_body("12345678909", "Joao Pereira"))
        .await;

    let response = app
        .get_authenticated("/api/users", &app.admin_token())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert!(!contains_key(&body, "password"));
}

// ===== Update =====

#[tokio::test]
async fn test_update_user_stamps_actor() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;
    let path = format!("/api/users/{}", created["id"].as_str().unwrap());

    let response = app
        .put_authenticated(&path, &app.admin_token())
        .json(&json!({
            "name": "Maria Souza",
            "updatedAt": "2000-01-01T00:00:00Z",
            "updatedBy": "Mallory"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Maria Souza");
    assert_eq!(body["cpf"], "11144477735");
    assert_eq!(body["updatedBy"], "Admin");
    assert_ne!(body["updatedAt"], "2000-01-01T00:00:00Z");
    assert_eq!(body["address"], created["address"]);
    assert!(!contains_key(&body, "password"));
}

#[tokio::test]
async fn test_update_user_password_changes_login() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;

    let response = app
        .put_authenticated(
            &format!("/api/users/{}", created["id"].as_str().unwrap()),
            &app.admin_token(),
        )
        .json(&json!({ "password": "brand-new-password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let old = app
        .post("/api/auth/login")
        .json(&json!({ "cpf": "11144477735", "password": "user-password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    app.login("11144477735", "brand-new-password").await;
}

#[tokio::test]
async fn test_update_user_to_taken_cpf() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;

    let response = app
        .put_authenticated(
            &format!("/api/users/{}", created["id"].as_str().unwrap()),
            &app.admin_token(),
        )
        .json(&json!({ "cpf": ADMIN_CPF }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_user_wrong_json_type() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;

    let response = app
        .put_authenticated(
            &format!("/api/users/{}", created["id"].as_str().unwrap()),
            &app.admin_token(),
        )
        .json(&json!({ "name": 42 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_user_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .put_authenticated(
            &format!("/api/users/{}", uuid::Uuid::new_v4()),
            &app.admin_token(),
        )
        .json(&json!({ "name": "Maria Souza" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ===== Delete =====

#[tokio::test]
async fn test_delete_user_soft_deletes() {
    let app = TestApp::spawn().await;
    let created = app
        .register(&registration_body("11144477735", "Maria Silva"))
        .await;
    let path = format!("/api/users/{}", created["id"].as_str().unwrap());

    let response = app
        .delete_authenticated(&path, &app.admin_token())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = app
        .get_authenticated(&path, &app.admin_token())
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Removed");
    assert_eq!(body["removedBy"], "Admin");
    assert!(body["removedAt"].is_string());
    assert_eq!(app.repository.count().await, 2);
}

#[tokio::test]
async fn test_delete_user_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .delete_authenticated(
            &format!("/api/users/{}", uuid::Uuid::new_v4()),
            &app.admin_token(),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
