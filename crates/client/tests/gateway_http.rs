use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use client::{ApiResponse, ClientError, Gateway};

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "auth": auth }))
}

async fn secure(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer good-token") => Ok(Json(json!({"status": "ok"}))),
        Some(_) => Err(StatusCode::FORBIDDEN),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn rejected() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "Error: Incorrect password!")
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/whoami", get(whoami))
        .route("/api/v1/secure", get(secure))
        .route("/api/v1/echo", post(echo))
        .route("/api/v1/rejected", post(rejected));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn gateway(addr: SocketAddr) -> Gateway {
    Gateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn attaches_bearer_header_only_when_token_present() {
    let gw = gateway(spawn_server().await);

    let resp: ApiResponse<Value> = gw.get_json("/whoami", Some("tok-1")).await.unwrap();
    let ApiResponse::Ok(body) = resp else { panic!("expected ok") };
    assert_eq!(body["auth"], "Bearer tok-1");

    // No token means no Authorization header at all.
    let resp: ApiResponse<Value> = gw.get_json("/whoami", None).await.unwrap();
    let ApiResponse::Ok(body) = resp else { panic!("expected ok") };
    assert_eq!(body["auth"], Value::Null);
}

#[tokio::test]
async fn unauthorized_and_forbidden_map_to_auth_expired() {
    let gw = gateway(spawn_server().await);

    let resp: ApiResponse<Value> = gw.get_json("/secure", None).await.unwrap();
    assert!(resp.is_auth_expired(), "401 should map to AuthExpired");

    let resp: ApiResponse<Value> = gw.get_json("/secure", Some("stale")).await.unwrap();
    assert!(resp.is_auth_expired(), "403 should map to AuthExpired");

    let resp: ApiResponse<Value> = gw.get_json("/secure", Some("good-token")).await.unwrap();
    assert!(matches!(resp, ApiResponse::Ok(_)));
}

#[tokio::test]
async fn json_bodies_round_trip() {
    let gw = gateway(spawn_server().await);

    let body = json!({"eventId": 42, "userId": 7});
    let resp: ApiResponse<Value> = gw.post_json("/echo", Some("tok"), &body).await.unwrap();
    let ApiResponse::Ok(echoed) = resp else { panic!("expected ok") };
    assert_eq!(echoed, body);
}

#[tokio::test]
async fn business_errors_carry_status_and_message_text() {
    let gw = gateway(spawn_server().await);

    let err = gw
        .post_public::<_, Value>("/rejected", &json!({"email": "x", "password": "y"}))
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Error: Incorrect password!");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}
