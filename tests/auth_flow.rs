use std::net::TcpListener;
use std::sync::Arc;

use notekeeper::configuration::AuthSettings;
use notekeeper::startup::run;
use notekeeper::testutils::{InMemoryNoteStore, InMemoryUserStore};
use serde_json::json;

const NAME: &str = "A";
const EMAIL: &str = "a@x.com";
const PASSWORD: &str = "pw123456";

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(
        listener,
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryNoteStore::new()),
        AuthSettings {
            secret: "integration-test-secret-0123456789".to_string(),
        },
    )
    .expect("Failed to start server");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

/// Client that keeps session cookies across requests, the way a browser does.
fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

async fn register(client: &reqwest::Client, address: &str) -> reqwest::Response {
    client
        .post(&format!("{}/api/v1/register", address))
        .json(&json!({"name": NAME, "email": EMAIL, "password": PASSWORD}))
        .send()
        .await
        .expect("Failed to execute request.")
}

fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

// --- Registration ---

#[tokio::test]
async fn register_returns_201_and_sets_both_session_cookies() {
    let address = spawn_app();
    let client = session_client();

    let response = register(&client, &address).await;

    assert_eq!(201, response.status().as_u16());
    assert!(cookie_value(&response, "access-token").is_some());
    assert!(cookie_value(&response, "refresh-token").is_some());
}

#[tokio::test]
async fn register_rejects_invalid_input_with_400() {
    let address = spawn_app();
    let client = reqwest::Client::new();

    let bad_payloads = vec![
        json!({"name": NAME, "email": "notanemail", "password": PASSWORD}),
        json!({"name": NAME, "email": EMAIL, "password": "short7"}),
        json!({"name": NAME, "email": EMAIL, "password": "a".repeat(73)}),
        json!({"name": "", "email": EMAIL, "password": PASSWORD}),
    ];

    for payload in bad_payloads {
        let response = client
            .post(&format!("{}/api/v1/register", address))
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(), "payload: {}", payload);
    }
}

#[tokio::test]
async fn register_with_taken_email_returns_409() {
    let address = spawn_app();
    let client = session_client();

    register(&client, &address).await;

    let response = client
        .post(&format!("{}/api/v1/register", address))
        .json(&json!({"name": "B", "email": EMAIL, "password": "otherpw123"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(409, response.status().as_u16());
}

// --- Login ---

#[tokio::test]
async fn login_returns_200_and_a_cookie_pair() {
    let address = spawn_app();
    register(&session_client(), &address).await;

    let client = session_client();
    let response = client
        .post(&format!("{}/api/v1/login", address))
        .json(&json!({"email": EMAIL, "password": PASSWORD}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert!(cookie_value(&response, "access-token").is_some());
    assert!(cookie_value(&response, "refresh-token").is_some());
}

#[tokio::test]
async fn login_with_unknown_email_returns_404() {
    let address = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/v1/login", address))
        .json(&json!({"email": "nobody@x.com", "password": PASSWORD}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let address = spawn_app();
    register(&session_client(), &address).await;

    let response = reqwest::Client::new()
        .post(&format!("{}/api/v1/login", address))
        .json(&json!({"email": EMAIL, "password": "pw1234567"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- The auth gate ---

#[tokio::test]
async fn protected_route_without_token_returns_401() {
    let address = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/v1/me", address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn protected_route_with_session_cookie_succeeds() {
    let address = spawn_app();
    let client = session_client();
    register(&client, &address).await;

    let response = client
        .get(&format!("{}/api/v1/me", address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["email"], EMAIL);
    assert_eq!(body["name"], NAME);
}

#[tokio::test]
async fn protected_route_with_garbage_token_returns_400() {
    let address = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/api/v1/me", address))
        .header("Cookie", "access-token=not.a.token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn protected_route_with_tampered_token_returns_401() {
    let address = spawn_app();
    let response = register(&session_client(), &address).await;
    let token = cookie_value(&response, "access-token").unwrap();

    // Flip a character inside the payload segment so the signature no
    // longer matches the claims.
    let mut parts: Vec<String> = token.split('.').map(String::from).collect();
    let flipped = if parts[1].starts_with('A') { "B" } else { "A" };
    parts[1].replace_range(0..1, flipped);
    let tampered = parts.join(".");

    let response = reqwest::Client::new()
        .get(&format!("{}/api/v1/me", address))
        .header("Cookie", format!("access-token={}", tampered))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Refresh ---

#[tokio::test]
async fn refresh_returns_a_new_valid_pair() {
    let address = spawn_app();
    let client = session_client();
    register(&client, &address).await;

    let response = client
        .post(&format!("{}/api/v1/refresh", address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert!(cookie_value(&response, "access-token").is_some());
    assert!(cookie_value(&response, "refresh-token").is_some());

    // The renewed cookies authenticate protected requests.
    let response = client
        .get(&format!("{}/api/v1/me", address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn refresh_without_cookie_returns_401() {
    let address = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/api/v1/refresh", address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_with_garbage_token_returns_400() {
    let address = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/api/v1/refresh", address))
        .header("Cookie", "refresh-token=not.a.token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

// --- Password change and revocation ---

#[tokio::test]
async fn change_password_revokes_previously_issued_refresh_tokens() {
    let address = spawn_app();
    let client = session_client();
    let response = register(&client, &address).await;
    let old_refresh = cookie_value(&response, "refresh-token").unwrap();

    let response = client
        .post(&format!("{}/api/v1/change_password", address))
        .json(&json!({"current_password": PASSWORD, "new_password": "newpw12345"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    // The refresh token minted before the change is now revoked.
    let response = reqwest::Client::new()
        .post(&format!("{}/api/v1/refresh", address))
        .header("Cookie", format!("refresh-token={}", old_refresh))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    // The old password no longer logs in; the new one does.
    let response = reqwest::Client::new()
        .post(&format!("{}/api/v1/login", address))
        .json(&json!({"email": EMAIL, "password": PASSWORD}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = reqwest::Client::new()
        .post(&format!("{}/api/v1/login", address))
        .json(&json!({"email": EMAIL, "password": "newpw12345"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn change_password_with_wrong_current_password_returns_401() {
    let address = spawn_app();
    let client = session_client();
    register(&client, &address).await;

    let response = client
        .post(&format!("{}/api/v1/change_password", address))
        .json(&json!({"current_password": "wrongcurrent", "new_password": "newpw12345"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn change_password_to_the_same_password_returns_400() {
    let address = spawn_app();
    let client = session_client();
    register(&client, &address).await;

    let response = client
        .post(&format!("{}/api/v1/change_password", address))
        .json(&json!({"current_password": PASSWORD, "new_password": PASSWORD}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

// --- Logout ---

#[tokio::test]
async fn logout_clears_both_session_cookies() {
    let address = spawn_app();
    let client = session_client();
    register(&client, &address).await;

    let response = client
        .post(&format!("{}/api/v1/logout", address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(cookie_value(&response, "access-token").as_deref(), Some(""));
    assert_eq!(cookie_value(&response, "refresh-token").as_deref(), Some(""));

    // The jar dropped the cookies, so the session is gone client-side.
    let response = client
        .get(&format!("{}/api/v1/me", address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}
