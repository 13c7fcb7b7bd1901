//! License installation against the Consul operator API.
//!
//! `LicenseInstaller` owns the HTTP client and endpoint settings. Each call to
//! [`LicenseInstaller::install_license`] performs exactly one PUT; failures are
//! returned to the caller untouched, with no retry.

use std::env::VarError;
use std::io::Write;

use reqwest::StatusCode;

use crate::config::{ConsulConfig, LicenseConfig};
use crate::error::InstallError;
use crate::invocation::{InvocationRequest, OutboundRequest};

/// Reads the license payload from the process environment.
#[derive(Debug, Clone)]
pub struct LicenseSource {
    env_var: String,
    required: bool,
}

impl LicenseSource {
    pub fn new(config: &LicenseConfig) -> Self {
        Self {
            env_var: config.env_var.clone(),
            required: config.required,
        }
    }

    /// Name of the environment variable this source reads
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Current value of the variable; unset reads as empty.
    pub fn read(&self) -> Result<String, InstallError> {
        match std::env::var(&self.env_var) {
            Ok(license) => Ok(license),
            Err(VarError::NotPresent) => Ok(String::new()),
            Err(VarError::NotUnicode(_)) => {
                tracing::warn!(env_var = %self.env_var, "License is not valid UTF-8");
                Err(InstallError::LicenseNotUnicode {
                    env_var: self.env_var.clone(),
                })
            }
        }
    }
}

/// Successful response from the license endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseResponse {
    pub status: StatusCode,
    pub lines: Vec<String>,
}

impl LicenseResponse {
    fn from_body(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            lines: body.lines().map(str::to_string).collect(),
        }
    }

    /// Write every body line to `out`, one per line.
    pub fn write_lines<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}

/// Sends licenses to Consul agents.
#[derive(Debug, Clone)]
pub struct LicenseInstaller {
    consul: ConsulConfig,
    license: LicenseSource,
    http_client: reqwest::Client,
}

impl LicenseInstaller {
    pub fn new(consul: ConsulConfig, license: LicenseConfig) -> Result<Self, InstallError> {
        // A 3xx is a failed install; following it would resend the license and token.
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = consul.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self::with_client(consul, license, http_client))
    }

    /// Use an existing client instead of building one.
    pub fn with_client(
        consul: ConsulConfig,
        license: LicenseConfig,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            license: LicenseSource::new(&license),
            consul,
            http_client,
        }
    }

    pub fn license_source(&self) -> &LicenseSource {
        &self.license
    }

    /// Resolve the outbound request without sending it.
    pub fn prepare(
        &self,
        request: &InvocationRequest,
        license: &str,
    ) -> Result<OutboundRequest, InstallError> {
        if license.is_empty() {
            if self.license.required {
                return Err(InstallError::MissingLicense {
                    env_var: self.license.env_var.clone(),
                });
            }
            tracing::warn!(
                env_var = %self.license.env_var,
                "License is empty, sending an empty body"
            );
        }

        OutboundRequest::build(request, license, &self.consul)
    }

    /// PUT `license` to the agent named by `request` and read the full response.
    pub async fn install_license(
        &self,
        request: &InvocationRequest,
        license: &str,
    ) -> Result<LicenseResponse, InstallError> {
        let outbound = self.prepare(request, license)?;
        self.send(outbound).await
    }

    /// Perform a prepared request.
    pub async fn send(&self, outbound: OutboundRequest) -> Result<LicenseResponse, InstallError> {
        tracing::info!(
            url = %outbound.url,
            has_token = outbound.token().is_some(),
            bytes = outbound.body.len(),
            "Installing license"
        );

        let response = self
            .http_client
            .request(outbound.method, outbound.target)
            .headers(outbound.headers)
            .body(outbound.body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "License install failed");
            return Err(InstallError::Status { status, body });
        }

        let body = response.text().await?;
        tracing::debug!(status = %status, bytes = body.len(), "License endpoint responded");

        Ok(LicenseResponse::from_body(status, &body))
    }
}
