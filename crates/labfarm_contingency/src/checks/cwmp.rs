use labfarm_devices::DeviceRole;

use crate::error::ContingencyError;
use crate::hooks::{Check, CheckContext};
use crate::report::InterfaceReport;

/// Skips the test when the firmware speaks another CWMP version than the
/// one requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct CwmpCheck;

impl Check for CwmpCheck {
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        tracing::info!("executing CWMP service check");

        let Some(requested) = ctx.requirement.cwmp_version.as_deref() else {
            return Ok(None);
        };

        let reported = ctx.devices.cpe(DeviceRole::Dut)?.cwmp_version()?;
        if reported != requested {
            tracing::warn!(requested, %reported, "CWMP version mismatch");
            return Err(ContingencyError::skip("Skipping Test: CWMP version mismatch"));
        }

        tracing::info!(version = requested, "CWMP service check executed");
        Ok(None)
    }
}
