//! In-process stub of the REST authority bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct Captured {
    pub authorization: Option<String>,
    pub form: HashMap<String, String>,
}

pub type Seen = Arc<Mutex<Vec<Captured>>>;

async fn push_authentication(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let token = form.get("push_token").cloned().unwrap_or_default();
    seen.lock().push(Captured { authorization, form });
    match token.as_str() {
        "good" => Json(serde_json::json!({"success": true})).into_response(),
        "html" => (StatusCode::BAD_GATEWAY, "<html>upstream down</html>").into_response(),
        _ => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "invalid_token", "message": "Token is invalid or expired"})),
        )
            .into_response(),
    }
}

// Start the stub authority; returns (join_handle, api_base, captured requests).
pub async fn start_stub_authority() -> (JoinHandle<()>, String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/rest/v1.1/me/two-step/push-authentication", post(push_authentication))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("stub authority error: {e:?}");
        }
    });
    (handle, format!("http://{}/rest/v1.1", addr), seen)
}

pub struct Guard(pub JoinHandle<()>);
impl Drop for Guard { fn drop(&mut self) { self.0.abort(); } }

