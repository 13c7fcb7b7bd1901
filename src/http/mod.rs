//! HTTP server hosting the invocation endpoint.
//!
//! The server includes:
//! - Plain HTTP listener on the configured host and port
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{serve, start_server, ServerError};
pub use shutdown::shutdown_signal;
