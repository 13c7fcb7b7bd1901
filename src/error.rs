use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("consul_server is missing or empty")]
    MissingServer,

    #[error("License is empty (environment variable {env_var} unset or blank)")]
    MissingLicense { env_var: String },

    #[error("License in environment variable {env_var} is not valid UTF-8")]
    LicenseNotUnicode { env_var: String },

    #[error("Invalid Consul URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid ACL token: {0}")]
    InvalidToken(String),

    #[error("Consul request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Consul returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to write response output: {0}")]
    Output(#[from] io::Error),
}

impl InstallError {
    /// Status code reported by the invocation endpoint for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            InstallError::MissingServer
            | InstallError::MissingLicense { .. }
            | InstallError::InvalidUrl { .. }
            | InstallError::InvalidToken(_) => StatusCode::BAD_REQUEST,
            InstallError::Request(_) | InstallError::Status { .. } => StatusCode::BAD_GATEWAY,
            InstallError::LicenseNotUnicode { .. } | InstallError::Output(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for InstallError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Invocation failed");
        } else {
            tracing::warn!(error = %self, "Invocation rejected");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
