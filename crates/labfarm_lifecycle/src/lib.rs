//! Session lifecycle for labfarm (Layer 2).
//!
//! An [`Orchestrator`] owns the session [`HookRegistry`](labfarm_hooks::HookRegistry),
//! the testbed configuration and, once registered, the
//! [`DeviceManager`](labfarm_devices::DeviceManager). Plugins fill the
//! registry; the orchestrator drives the devices through the deployment
//! phases by dispatching one hook per phase:
//!
//! | Phase | Hook | Mode |
//! |-------|------|------|
//! | register | [`AddDevices`](hooks::AddDevices), [`RegisterDevices`](hooks::RegisterDevices) | collect-all, first-result |
//! | validate | [`ValidateDeviceRequirements`](hooks::ValidateDeviceRequirements) | collect-all |
//! | boot / configure | [`ServerBoot`](hooks::ServerBoot) ... [`AttachedDeviceConfigure`](hooks::AttachedDeviceConfigure) | collect-all |
//! | shutdown | [`ShutdownDevice`](hooks::ShutdownDevice) | collect-all |
//!
//! Between deployment and shutdown, [`Orchestrator::contingency_check`]
//! dispatches the `contingency_check` hook before each test body.
//!
//! # Modules
//!
//! - [`config`] - Testbed configuration and run switches
//! - [`phase`] - The phase state machine
//! - [`hooks`] - Phase hook specifications and handler traits
//! - [`plugin`] - The plugin trait
//! - [`registrar`] - Inventory-driven device registration
//! - [`orchestrator`] - The session runtime

pub mod config;
pub mod error;
pub mod hooks;
pub mod orchestrator;
pub mod phase;
pub mod plugin;
pub mod registrar;

pub use config::{RunOptions, TestbedConfig};
pub use error::{BoxError, LifecycleError};
pub use hooks::{DeviceCatalog, DeviceRegistrar, PhaseContext, PhaseHandler, PhaseHook, RegistrationContext};
pub use orchestrator::Orchestrator;
pub use phase::LifecyclePhase;
pub use plugin::{Plugin, PluginId};
pub use registrar::InventoryRegistrar;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::hooks::*;
    pub use crate::orchestrator::*;
    pub use crate::phase::*;
    pub use crate::plugin::*;
    pub use crate::registrar::*;
}
