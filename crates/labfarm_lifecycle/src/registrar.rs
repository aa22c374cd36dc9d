//! Inventory-driven device registration.

use labfarm_devices::{DeviceError, DeviceManager};

use crate::error::BoxError;
use crate::hooks::{DeviceRegistrar, RegistrationContext};

/// Creates one device per inventory entry and binds it by name.
///
/// An entry named after a role (`wan`, `lan2`, `board`) is bound to that
/// role; an entry with an `array` joins the array. Entries may do both.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryRegistrar;

impl DeviceRegistrar for InventoryRegistrar {
    fn register_devices(&self, ctx: &RegistrationContext<'_>) -> Result<Option<DeviceManager>, BoxError> {
        let mut builder = DeviceManager::builder();

        for spec in &ctx.config.devices {
            let role = spec.role();
            if role.is_none() && spec.array.is_none() {
                return Err(DeviceError::UnknownRole(spec.name.clone()).into());
            }

            let device = ctx.known.spawn(spec)?;
            if let Some(role) = role {
                builder.bind(role, device.clone())?;
            }
            if let Some(array) = spec.array {
                builder.push(array, device)?;
            }
            tracing::debug!(device = %spec.name, kind = %spec.kind, ?role, array = ?spec.array, "device registered");
        }

        let devices = builder.build();
        tracing::info!(
            testbed = %ctx.config.name,
            devices = ctx.config.devices.len(),
            session = %devices.session().session_id,
            "inventory registered"
        );
        Ok(Some(devices))
    }
}
