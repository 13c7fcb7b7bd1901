//! consul-license: installs a Consul Enterprise license through the operator API.
//!
//! The handler takes an event `{ "consul_server": ..., "token"?: ... }`, reads the
//! license from the `LICENSE` environment variable, PUTs it to
//! `{consul_server}:8500/v1/operator/license` and prints the response body line
//! by line. It can be hosted as a one-shot CLI call, an HTTP invocation
//! endpoint, or an AWS Lambda function.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod installer;
pub mod invocation;
pub mod lambda;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::InstallError;
pub use handler::{handle_invocation, handle_invocation_to};
pub use installer::{LicenseInstaller, LicenseResponse, LicenseSource};
pub use invocation::{InvocationRequest, OutboundRequest};
