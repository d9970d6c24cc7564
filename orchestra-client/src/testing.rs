//! Stub Orchestra API for client tests

use axum::Router;
use axum::http::HeaderMap;

use crate::{ApiUrl, OrchestraClient};

pub const API_KEY: &str = "test-key";

/// Route prefix matching the production path layout
pub const PREFIX: &str = "/api/engine/public/pipelines";

/// Serve `router` on an ephemeral port and return a client pointed at it
pub async fn spawn_client(router: Router, api_key: Option<&str>) -> OrchestraClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Stub server has no address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server failed");
    });

    let api_url = ApiUrl::parse(format!("http://{}{}/{{}}", addr, PREFIX)).unwrap();
    OrchestraClient::new(api_url, api_key.map(str::to_string)).unwrap()
}

/// Whether the request carries the expected bearer token
pub fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", API_KEY))
}
