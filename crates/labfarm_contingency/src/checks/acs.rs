use labfarm_devices::DeviceRole;

use crate::error::ContingencyError;
use crate::hooks::{Check, CheckContext};
use crate::report::InterfaceReport;
use crate::retry::RetryPolicy;

/// Parameter read to prove the ACS can manage the device under test.
pub const SOFTWARE_VERSION_PARAMETER: &str = "Device.DeviceInfo.SoftwareVersion";

/// Confirms the ACS reaches the device under test, and that a capture
/// session is active when packet analysis is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcsCheck {
    retry: RetryPolicy,
}

impl AcsCheck {
    /// Creates the check with the retry budget of the parameter read.
    #[must_use]
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

impl Check for AcsCheck {
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        tracing::info!("executing ACS service check");

        let acs = ctx.devices.acs_server(DeviceRole::AcsServer)?;
        let cpe_id = ctx.devices.cpe(DeviceRole::Dut)?.cpe_id()?;
        let packet_analysis = ctx.requirement.tr069.is_some_and(|tr069| tr069.packet_analysis);

        let connected = self
            .retry
            .retry("acs_server", "GPV", |timeout| {
                acs.get_parameter_value(SOFTWARE_VERSION_PARAMETER, timeout)
            })
            .map(|version| !version.is_empty())
            .unwrap_or_else(|error| {
                tracing::warn!(%cpe_id, %error, attempts = self.retry.attempts(), "ACS unreachable");
                false
            });
        if !connected {
            return Err(ContingencyError::hard_failure("ACS service check Failed."));
        }

        if packet_analysis && !acs.session_connected() {
            return Err(ContingencyError::hard_failure(
                "ACS service check Failed: packet analysis session is not connected.",
            ));
        }

        tracing::info!(%cpe_id, packet_analysis, "ACS service check executed");
        Ok(None)
    }
}
