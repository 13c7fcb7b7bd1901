//! Invocation payload and the outbound request derived from it.
//!
//! `InvocationRequest` is what the hosting platform hands the handler.
//! `OutboundRequest` is the fully-resolved PUT sent to the Consul agent; it is
//! built without any network I/O so its shape can be checked directly.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{ConsulConfig, CONSUL_TOKEN_HEADER};
use crate::error::InstallError;

/// Event payload: `{ "consul_server": string, "token"?: string }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvocationRequest {
    /// Scheme and host of the Consul agent, e.g. `http://10.0.0.5`
    pub consul_server: String,
    /// ACL token sent as `X-Consul-Token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl InvocationRequest {
    pub fn new(consul_server: impl Into<String>) -> Self {
        Self {
            consul_server: consul_server.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parse an event payload from JSON.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// A single PUT to the operator license endpoint.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// `{consul_server}:{port}{path}` exactly as concatenated
    pub url: String,
    /// `url` after parsing; scheme and host are lowercased and a default port dropped
    pub target: Url,
    pub method: Method,
    pub body: String,
    pub headers: HeaderMap,
}

impl OutboundRequest {
    /// Resolve the request for `request`, carrying `license` as the body.
    ///
    /// The URL is plain concatenation of `consul_server`, `:`, the configured
    /// port and path; nothing in `consul_server` is escaped. That string is kept
    /// in `url`. It must also parse as a URL, and the parsed (normalized) form in
    /// `target` is what the client connects to.
    pub fn build(
        request: &InvocationRequest,
        license: &str,
        consul: &ConsulConfig,
    ) -> Result<Self, InstallError> {
        if request.consul_server.trim().is_empty() {
            return Err(InstallError::MissingServer);
        }

        let url = license_url(&request.consul_server, consul);
        let target = Url::parse(&url).map_err(|e| InstallError::InvalidUrl {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        match &request.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(token)
                    .map_err(|e| InstallError::InvalidToken(e.to_string()))?;
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static(CONSUL_TOKEN_HEADER), value);
            }
            None => tracing::info!("no token defined"),
        }

        Ok(Self {
            url,
            target,
            method: Method::PUT,
            body: license.to_string(),
            headers,
        })
    }

    /// The ACL token header, if one is attached.
    pub fn token(&self) -> Option<&HeaderValue> {
        self.headers.get(CONSUL_TOKEN_HEADER)
    }
}

/// `{consul_server}:{port}{path}`, by concatenation.
pub fn license_url(consul_server: &str, consul: &ConsulConfig) -> String {
    format!("{}:{}{}", consul_server, consul.port, consul.path)
}
