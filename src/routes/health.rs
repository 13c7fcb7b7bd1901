//! Liveness probe for the invocation endpoint.

/// Returns "ok" while the process can answer HTTP. Consul is not contacted.
pub async fn health() -> &'static str {
    "ok"
}
