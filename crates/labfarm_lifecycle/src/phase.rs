//! Deployment phases.

use core::fmt;

/// A deployment phase. Phases run in declaration order, each at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecyclePhase {
    /// Known device types are collected and the device manager is populated.
    RegisterDevices,
    /// Devices check their requirements before anything is deployed.
    ValidateDeviceRequirements,
    /// Devices with no dependency on others boot (WAN, CMTS).
    ServerBoot,
    /// Servers are configured.
    ServerConfigure,
    /// Devices depending on servers boot (the CPE).
    DeviceBoot,
    /// Dependent devices are configured.
    DeviceConfigure,
    /// Devices attached to another device boot (LAN clients).
    AttachedDeviceBoot,
    /// Attached devices are configured.
    AttachedDeviceConfigure,
    /// Devices release their resources.
    Shutdown,
}

impl LifecyclePhase {
    /// Every phase, in execution order.
    pub const ALL: [LifecyclePhase; 9] = [
        LifecyclePhase::RegisterDevices,
        LifecyclePhase::ValidateDeviceRequirements,
        LifecyclePhase::ServerBoot,
        LifecyclePhase::ServerConfigure,
        LifecyclePhase::DeviceBoot,
        LifecyclePhase::DeviceConfigure,
        LifecyclePhase::AttachedDeviceBoot,
        LifecyclePhase::AttachedDeviceConfigure,
        LifecyclePhase::Shutdown,
    ];

    /// Returns the name of the hook dispatched for this phase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::RegisterDevices => "register_devices",
            LifecyclePhase::ValidateDeviceRequirements => "validate_device_requirements",
            LifecyclePhase::ServerBoot => "server_boot",
            LifecyclePhase::ServerConfigure => "server_configure",
            LifecyclePhase::DeviceBoot => "device_boot",
            LifecyclePhase::DeviceConfigure => "device_configure",
            LifecyclePhase::AttachedDeviceBoot => "attached_device_boot",
            LifecyclePhase::AttachedDeviceConfigure => "attached_device_configure",
            LifecyclePhase::Shutdown => "shutdown_device",
        }
    }

    /// Returns the phase after this one.
    #[must_use]
    pub fn next(&self) -> Option<LifecyclePhase> {
        let index = Self::ALL.iter().position(|phase| phase == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// Returns true for the boot and configure phases skip-boot bypasses.
    #[must_use]
    pub fn is_boot_or_configure(&self) -> bool {
        !matches!(
            self,
            LifecyclePhase::RegisterDevices
                | LifecyclePhase::ValidateDeviceRequirements
                | LifecyclePhase::Shutdown
        )
    }

    /// Returns true if a session whose last phase is `current` may enter
    /// this phase. Phases only move forward; skipping ahead is allowed.
    #[must_use]
    pub fn can_follow(&self, current: Option<LifecyclePhase>) -> bool {
        current.is_none_or(|current| *self > current)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
