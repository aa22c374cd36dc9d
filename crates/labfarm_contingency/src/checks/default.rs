use labfarm_devices::{DeviceHandle, DeviceRole};

use crate::error::ContingencyError;
use crate::hooks::{Check, CheckContext};
use crate::report::InterfaceReport;

/// Command every responsive console must echo back.
pub const PROMPT_PROBE: &str = r#"echo "FOO""#;

/// Verifies that each device answers [`PROMPT_PROBE`].
///
/// # Errors
///
/// Returns [`ContingencyError::HardCheckFailure`] naming the first device
/// whose console errors or does not echo the marker.
pub fn check_prompts(devices: &[DeviceHandle]) -> Result<(), ContingencyError> {
    for device in devices {
        let echoed = device
            .execute(PROMPT_PROBE)
            .is_ok_and(|output| output.contains("FOO"));
        if !echoed {
            return Err(ContingencyError::hard_failure(format!(
                "Failed to validate prompt for device: {}",
                device.name()
            )));
        }
    }
    Ok(())
}

/// Prompt responsiveness of the WAN side, the LAN clients and, when voice
/// is required, the SIP server and softphone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChecks;

impl Check for DefaultChecks {
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        tracing::info!("executing default service check [check_prompts]");

        let devices = ctx.devices;
        let mut targets = vec![
            devices.by_type(DeviceRole::Wan)?,
            devices.by_type(DeviceRole::Provisioner)?,
        ];
        if ctx.requirement.voice {
            targets.push(devices.by_type(DeviceRole::Sipcenter)?);
            targets.push(devices.by_type(DeviceRole::Softphone)?);
        }
        // LAN clients are optional in a testbed.
        targets.extend(devices.by_types(&[DeviceRole::Lan, DeviceRole::Lan2]));

        check_prompts(&targets)?;

        tracing::info!(devices = targets.len(), "default service check [check_prompts] executed");
        Ok(None)
    }
}
