//! AWS Lambda host.
//!
//! Each event is deserialized straight into an [`InvocationRequest`]; a failed
//! install is returned to the runtime, which reports the invocation as failed.

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};

use crate::handler::handle_invocation;
use crate::installer::LicenseInstaller;
use crate::invocation::InvocationRequest;

/// Run the Lambda runtime loop until the platform shuts the process down.
pub async fn run(installer: LicenseInstaller) -> Result<(), Error> {
    let installer = Arc::new(installer);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<InvocationRequest>| {
        let installer = Arc::clone(&installer);
        async move { function_handler(&installer, event).await }
    }))
    .await
}

async fn function_handler(
    installer: &LicenseInstaller,
    event: LambdaEvent<InvocationRequest>,
) -> Result<(), Error> {
    let (request, context) = event.into_parts();
    tracing::info!(
        aws_request_id = %context.request_id,
        has_token = request.token.is_some(),
        "Invocation received"
    );

    handle_invocation(installer, &request).await?;
    Ok(())
}
