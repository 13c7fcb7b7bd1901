//! Per-invocation request id.
//!
//! Every request to the invocation endpoint gets a UUID v4. It names the
//! tracing span the install runs under and is echoed back in the `/invoke`
//! response so a caller can find the matching log lines.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Request id stored in request extensions by [`request_id_layer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Tag the request with a [`RequestId`] and run it inside a span carrying it.
///
/// Must be the outermost layer so the span covers every other layer.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let id = RequestId::generate();
    request.extensions_mut().insert(id);

    let span = tracing::info_span!(
        "invocation",
        request_id = %id.0,
        path = %request.uri().path(),
        elapsed_ms = tracing::field::Empty,
    );
    let started = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    span.record("elapsed_ms", elapsed_ms);
    span.in_scope(|| {
        tracing::info!(status = response.status().as_u16(), elapsed_ms, "Invocation finished");
    });

    response
}
