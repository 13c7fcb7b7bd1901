//! Fake Consul agent for integration tests.
//!
//! Serves the operator license endpoint on an ephemeral port and records every
//! request it receives so tests can assert on method, headers and body.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header::LOCATION, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;

use consul_license::config::{ConsulConfig, LicenseConfig, CONSUL_LICENSE_PATH};
use consul_license::LicenseInstaller;

/// License body returned by the fake agent on success.
pub const LICENSE_RESPONSE: &str = "{\n  \"Valid\": true,\n  \"Warnings\": []\n}\n";

/// Redirect target served alongside the license endpoint; always answers 200.
pub const MOVED_PATH: &str = "/elsewhere";

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub method: Method,
    pub token: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: &'static str,
    location: Option<&'static str>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct FakeConsul {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeConsul {
    /// Start an agent that answers 200 with [`LICENSE_RESPONSE`].
    pub async fn start() -> Self {
        Self::start_with(StatusCode::OK, LICENSE_RESPONSE).await
    }

    pub async fn start_with(status: StatusCode, body: &'static str) -> Self {
        Self::serve(status, body, None).await
    }

    /// Start an agent whose license endpoint answers 301 to [`MOVED_PATH`].
    pub async fn start_moved() -> Self {
        Self::serve(StatusCode::MOVED_PERMANENTLY, "", Some(MOVED_PATH)).await
    }

    async fn serve(status: StatusCode, body: &'static str, location: Option<&'static str>) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            body,
            location,
            captured: Arc::clone(&captured),
        };

        let app = Router::new()
            .route(CONSUL_LICENSE_PATH, any(license_endpoint))
            .route(MOVED_PATH, any(moved_endpoint))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, captured }
    }

    /// `consul_server` value pointing at this agent (scheme and host only).
    pub fn server(&self) -> String {
        "http://127.0.0.1".to_string()
    }

    pub fn consul_config(&self) -> ConsulConfig {
        ConsulConfig {
            port: self.addr.port(),
            timeout_seconds: Some(5),
            ..ConsulConfig::default()
        }
    }

    pub fn installer(&self, env_var: &str) -> LicenseInstaller {
        LicenseInstaller::new(
            self.consul_config(),
            LicenseConfig {
                env_var: env_var.to_string(),
                required: false,
            },
        )
        .unwrap()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

fn capture(state: &FakeState, uri: &Uri, method: Method, headers: &HeaderMap, body: String) {
    let token = headers
        .get("X-Consul-Token")
        .map(|v| v.to_str().unwrap().to_string());

    state.captured.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_string(),
        method,
        token,
        body,
    });
}

async fn license_endpoint(
    State(state): State<FakeState>,
    uri: Uri,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    capture(&state, &uri, method, &headers, body);

    match state.location {
        Some(location) => (state.status, [(LOCATION, location)], state.body).into_response(),
        None => (state.status, state.body).into_response(),
    }
}

async fn moved_endpoint(
    State(state): State<FakeState>,
    uri: Uri,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    capture(&state, &uri, method, &headers, body);
    (StatusCode::OK, LICENSE_RESPONSE)
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
