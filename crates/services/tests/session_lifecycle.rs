//! Login-to-logout lifecycle through the wired [`AppServices`] aggregate.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use drive_core::time::{FIXED_TEST_TIMESTAMP, fixed_clock};
use serde_json::json;
use services::api::ApiConfig;
use services::app_services::AppServices;
use services::connectivity::AssumeOnline;
use services::error::{ApiError, TicketServiceError};
use services::session_manager::ServerHealth;

fn encode_token(sub: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "exp": exp, "roles": ["STUDENT"] }).to_string());
    format!("{header}.{payload}.sig")
}

#[tokio::test]
async fn login_unlocks_bearer_calls_and_logout_revokes_them() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/health")
        .with_body("ok")
        .create_async()
        .await;
    let access = encode_token("42", FIXED_TEST_TIMESTAMP + 3_600);
    server
        .mock("POST", "/api/v1/auth/login")
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "accessToken": access, "refreshToken": "refresh-1" }).to_string(),
        )
        .create_async()
        .await;
    let tickets = server
        .mock("GET", "/api/v1/tickets")
        .match_header("authorization", format!("Bearer {access}").as_str())
        .with_header("content-type", "application/json")
        .with_body(json!([{ "ticketNumber": 1, "questionNumbers": 20 }]).to_string())
        .create_async()
        .await;

    let config = ApiConfig::new(&format!("{}/api", server.url())).unwrap();
    let app = AppServices::new_in_memory(&config, fixed_clock()).unwrap();
    let session = app.session();

    session.initialize(&AssumeOnline).await;
    assert_eq!(session.server_health().await, ServerHealth::Healthy);
    assert!(!session.is_authenticated().await);

    assert!(session.login("student@example.com", "secret").await);
    assert!(session.is_authenticated().await);
    let identity = session.identity().await.unwrap();
    assert_eq!(identity.user_id, "42");
    assert!(identity.has_role("STUDENT"));

    let summaries = app.tickets().list_tickets().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].ticket_number, 1);
    tickets.assert_async().await;

    session.logout().await;
    assert!(!session.is_authenticated().await);

    // with the tokens gone, bearer calls fail before reaching the server
    let err = app.tickets().list_tickets().await.unwrap_err();
    assert!(matches!(
        err,
        TicketServiceError::Api(ApiError::MissingToken)
    ));
    session.shutdown();
}
