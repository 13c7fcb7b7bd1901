//! Function handler body shared by every host.

use std::io::Write;

use crate::error::InstallError;
use crate::installer::{LicenseInstaller, LicenseResponse};
use crate::invocation::InvocationRequest;

/// Handle one invocation, printing the response lines to stdout.
pub async fn handle_invocation(
    installer: &LicenseInstaller,
    request: &InvocationRequest,
) -> Result<LicenseResponse, InstallError> {
    let response = install(installer, request).await?;
    response.write_lines(&mut std::io::stdout().lock())?;
    Ok(response)
}

/// Handle one invocation, writing the response lines to `out`.
pub async fn handle_invocation_to<W: Write>(
    installer: &LicenseInstaller,
    request: &InvocationRequest,
    out: &mut W,
) -> Result<LicenseResponse, InstallError> {
    let response = install(installer, request).await?;
    response.write_lines(out)?;
    Ok(response)
}

// The license is read at call time so a changed variable is seen by the next invocation.
async fn install(
    installer: &LicenseInstaller,
    request: &InvocationRequest,
) -> Result<LicenseResponse, InstallError> {
    let license = installer.license_source().read()?;
    let response = installer.install_license(request, &license).await?;

    tracing::info!(
        consul_server = %request.consul_server,
        status = %response.status,
        lines = response.lines.len(),
        "License installed"
    );

    Ok(response)
}
