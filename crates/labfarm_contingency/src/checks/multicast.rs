use crate::error::ContingencyError;
use crate::hooks::{Check, CheckContext};
use crate::report::InterfaceReport;

/// Skips the test when fewer than one multicast server is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct MulticastCheck;

impl Check for MulticastCheck {
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        tracing::info!("executing multicast server count check");

        let Some(count) = ctx.requirement.multicast_server_count else {
            return Ok(None);
        };
        if count < 1 {
            return Err(ContingencyError::skip(
                "Skipping Test: Required multicast server count is not specified",
            ));
        }

        tracing::info!(count, "multicast server count check executed");
        Ok(None)
    }
}
