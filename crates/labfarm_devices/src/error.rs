//! Error types for device registration, lookup and driver calls.

use core::time::Duration;

use thiserror::Error;

use crate::role::{DeviceArray, DeviceRole};

/// Errors raised by the device manager and by device drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// A required role has no device bound to it.
    #[error("no device registered for role '{0}'")]
    DeviceNotFound(DeviceRole),

    /// An array index or expression did not resolve to a device.
    #[error("no device found for '{0}'")]
    NoSuchDevice(String),

    /// The role already has a device bound to it.
    #[error("role '{0}' already has a device bound to it")]
    DuplicateRole(DeviceRole),

    /// The same handle was bound to a second role.
    #[error("device '{device}' is bound to role '{existing}' and cannot also be bound to '{requested}'")]
    AliasedHandle {
        /// Name of the device.
        device: String,
        /// Role the device is already bound to.
        existing: DeviceRole,
        /// Role the second binding asked for.
        requested: DeviceRole,
    },

    /// The same handle was pushed twice into one array.
    #[error("device '{device}' is already a member of '{array}'")]
    DuplicateArrayMember {
        /// Name of the device.
        device: String,
        /// The array holding it.
        array: DeviceArray,
    },

    /// The device bound to a role does not provide a capability.
    #[error("device '{device}' bound to role '{role}' does not provide the {capability} capability")]
    MissingCapability {
        /// Role that was looked up.
        role: DeviceRole,
        /// Name of the bound device.
        device: String,
        /// Capability that was requested.
        capability: &'static str,
    },

    /// The device bound to a role is not of the requested concrete type.
    #[error("device '{device}' bound to role '{role}' is not a {expected}")]
    TypeMismatch {
        /// Role that was looked up.
        role: DeviceRole,
        /// Name of the bound device.
        device: String,
        /// Requested Rust type.
        expected: &'static str,
    },

    /// A role name could not be parsed.
    #[error("unknown device role '{0}'")]
    UnknownRole(String),

    /// An array name could not be parsed.
    #[error("unknown device array '{0}'")]
    UnknownArray(String),

    /// An inventory expression is malformed.
    #[error("invalid device expression '{0}'")]
    InvalidExpression(String),

    /// No factory is known for an inventory device type.
    #[error("no device class found for type '{0}'")]
    UnknownDeviceKind(String),

    /// Two catalogs provide a factory for the same device type.
    #[error("device type '{0}' is already known")]
    DuplicateDeviceKind(String),

    /// A device factory rejected its inventory entry.
    #[error("cannot create device '{device}': {message}")]
    Spawn {
        /// Inventory name of the device.
        device: String,
        /// Reason given by the factory.
        message: String,
    },

    /// A command sent to a device failed.
    #[error("command failed on '{device}': {message}")]
    Command {
        /// Name of the device.
        device: String,
        /// Failure reported by the driver.
        message: String,
    },

    /// A driver call did not complete within its time budget.
    #[error("{operation} on '{device}' did not complete within {after:?}")]
    Timeout {
        /// Name of the device.
        device: String,
        /// The call that overran.
        operation: String,
        /// The budget that was exceeded.
        after: Duration,
    },
}

impl DeviceError {
    /// Creates a [`Command`](Self::Command) error.
    pub fn command(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Creates a [`Timeout`](Self::Timeout) error.
    pub fn timeout(device: impl Into<String>, operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            device: device.into(),
            operation: operation.into(),
            after,
        }
    }

    /// Creates a [`Spawn`](Self::Spawn) error.
    pub fn spawn(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Spawn {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error indicates a setup defect rather than a
    /// condition of the running environment.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownDeviceKind(_)
                | Self::DuplicateDeviceKind(_)
                | Self::UnknownRole(_)
                | Self::UnknownArray(_)
                | Self::InvalidExpression(_)
                | Self::DuplicateRole(_)
                | Self::AliasedHandle { .. }
                | Self::DuplicateArrayMember { .. }
        )
    }
}
