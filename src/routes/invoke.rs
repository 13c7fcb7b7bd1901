//! Invocation endpoint: one POST runs the handler once.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::error::InstallError;
use crate::handler::handle_invocation;
use crate::invocation::InvocationRequest;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Body returned for a successful invocation.
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    /// Id of the span this invocation was logged under
    pub request_id: String,
    /// Status returned by the Consul agent
    pub status: u16,
    /// Response body lines, as printed to stdout
    pub lines: Vec<String>,
}

/// POST /invoke
///
/// Accepts the event payload `{ "consul_server": ..., "token"?: ... }`.
pub async fn invoke(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(request): Json<InvocationRequest>,
) -> Result<Json<InvokeResponse>, InstallError> {
    tracing::debug!(
        %request_id,
        consul_server = %request.consul_server,
        "Invocation received"
    );

    let response = handle_invocation(&state.installer, &request).await?;

    Ok(Json(InvokeResponse {
        request_id: request_id.to_string(),
        status: response.status.as_u16(),
        lines: response.lines,
    }))
}
