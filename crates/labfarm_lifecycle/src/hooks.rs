//! Hook specifications of the deployment phases.
//!
//! Every phase after registration dispatches one collect-all hook whose
//! implementations receive a [`PhaseContext`]. Registration itself uses two
//! hooks:
//!
//! - [`AddDevices`] collects the device types each plugin can create
//! - [`RegisterDevices`] asks for the populated [`DeviceManager`]; the first
//!   implementation that returns one wins
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use labfarm_hooks::{HookRegistry, Priority};
//! use labfarm_lifecycle::error::BoxError;
//! use labfarm_lifecycle::hooks::{PhaseContext, PhaseHandler, ServerBoot};
//!
//! let hooks = HookRegistry::new();
//! let boot_wan: Arc<dyn PhaseHandler> = Arc::new(|ctx: &PhaseContext<'_>| -> Result<(), BoxError> {
//!     tracing::info!(testbed = %ctx.config.name, "booting WAN");
//!     Ok(())
//! });
//! hooks.register::<ServerBoot>("wan", Priority::Normal, boot_wan).unwrap();
//! ```

use labfarm_devices::{DeviceManager, KnownDevices};
use labfarm_hooks::{DispatchMode, HookRegistry, HookSpec};

use crate::config::{RunOptions, TestbedConfig};
use crate::error::BoxError;
use crate::phase::LifecyclePhase;

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Source of device types a plugin knows how to create.
pub trait DeviceCatalog: Send + Sync {
    /// Returns the device types this implementation provides.
    fn known_devices(&self) -> KnownDevices;
}

/// Collects [`KnownDevices`] from every plugin.
pub struct AddDevices;

impl HookSpec for AddDevices {
    const NAME: &'static str = "add_devices";
    const MODE: DispatchMode = DispatchMode::CollectAll;
    type Impl = dyn DeviceCatalog;
    type Args<'a> = ();
    type Output = KnownDevices;
    type Error = BoxError;

    fn invoke(catalog: &Self::Impl, _: &()) -> Result<Option<KnownDevices>, BoxError> {
        Ok(Some(catalog.known_devices()))
    }
}

/// Arguments of [`RegisterDevices`].
#[derive(Debug, Clone, Copy)]
pub struct RegistrationContext<'a> {
    /// Testbed being deployed.
    pub config: &'a TestbedConfig,
    /// Run switches.
    pub options: &'a RunOptions,
    /// Every device type the plugins provide.
    pub known: &'a KnownDevices,
    /// Session registry. Devices may register their own phase handlers.
    pub hooks: &'a HookRegistry,
}

/// Creates the session's devices.
pub trait DeviceRegistrar: Send + Sync {
    /// Returns the populated device manager, or `None` to let the next
    /// implementation handle registration.
    ///
    /// # Errors
    ///
    /// Returns any error that makes the testbed unusable, typically a
    /// device type no plugin provides.
    fn register_devices(&self, ctx: &RegistrationContext<'_>) -> Result<Option<DeviceManager>, BoxError>;
}

/// Produces the session's [`DeviceManager`]. First result wins.
pub struct RegisterDevices;

impl HookSpec for RegisterDevices {
    const NAME: &'static str = "register_devices";
    const MODE: DispatchMode = DispatchMode::FirstResult;
    type Impl = dyn DeviceRegistrar;
    type Args<'a> = RegistrationContext<'a>;
    type Output = DeviceManager;
    type Error = BoxError;

    fn invoke(registrar: &Self::Impl, ctx: &Self::Args<'_>) -> Result<Option<DeviceManager>, BoxError> {
        registrar.register_devices(ctx)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments of every phase hook after registration.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext<'a> {
    /// Testbed being deployed.
    pub config: &'a TestbedConfig,
    /// Run switches.
    pub options: &'a RunOptions,
    /// Live devices of the session.
    pub devices: &'a DeviceManager,
}

/// Implementation of a phase hook.
///
/// Implemented for every `Fn(&PhaseContext) -> Result<(), BoxError>`.
pub trait PhaseHandler: Send + Sync {
    /// Runs the phase for the devices this handler is responsible for.
    ///
    /// # Errors
    ///
    /// Any error aborts the deployment.
    fn run(&self, ctx: &PhaseContext<'_>) -> Result<(), BoxError>;
}

impl<F> PhaseHandler for F
where
    F: Fn(&PhaseContext<'_>) -> Result<(), BoxError> + Send + Sync,
{
    fn run(&self, ctx: &PhaseContext<'_>) -> Result<(), BoxError> {
        self(ctx)
    }
}

/// A hook dispatched for one [`LifecyclePhase`].
pub trait PhaseHook: HookSpec<Impl = dyn PhaseHandler> {
    /// Phase this hook belongs to.
    const PHASE: LifecyclePhase;

    /// Runs every implementation registered in `hooks`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first implementation error. Later implementations are
    /// not run.
    fn run_all(hooks: &HookRegistry, ctx: &PhaseContext<'_>) -> Result<(), BoxError>;
}

macro_rules! phase_hooks {
    ($($(#[$meta:meta])* $spec:ident => $phase:ident;)*) => {$(
        $(#[$meta])*
        pub struct $spec;

        impl HookSpec for $spec {
            const NAME: &'static str = LifecyclePhase::$phase.as_str();
            const MODE: DispatchMode = DispatchMode::CollectAll;
            type Impl = dyn PhaseHandler;
            type Args<'a> = PhaseContext<'a>;
            type Output = ();
            type Error = BoxError;

            fn invoke(handler: &Self::Impl, ctx: &Self::Args<'_>) -> Result<Option<()>, BoxError> {
                handler.run(ctx).map(|()| None)
            }
        }

        impl PhaseHook for $spec {
            const PHASE: LifecyclePhase = LifecyclePhase::$phase;

            fn run_all(hooks: &HookRegistry, ctx: &PhaseContext<'_>) -> Result<(), BoxError> {
                hooks.dispatch::<$spec>(ctx).map(drop)
            }
        }
    )*};
}

phase_hooks! {
    /// Devices check their requirements before anything is deployed.
    ValidateDeviceRequirements => ValidateDeviceRequirements;
    /// Boots devices with no dependency on others.
    ServerBoot => ServerBoot;
    /// Configures booted servers.
    ServerConfigure => ServerConfigure;
    /// Boots devices that depend on servers.
    DeviceBoot => DeviceBoot;
    /// Configures dependent devices.
    DeviceConfigure => DeviceConfigure;
    /// Boots devices attached to another device.
    AttachedDeviceBoot => AttachedDeviceBoot;
    /// Configures attached devices.
    AttachedDeviceConfigure => AttachedDeviceConfigure;
    /// Releases device resources before the session ends.
    ShutdownDevice => Shutdown;
}

#[cfg(test)]
mod tests {
    use super::*;
    use labfarm_hooks::HookId;

    #[test]
    fn phase_hooks_are_named_after_their_phase() {
        assert_eq!(HookId::of::<ServerBoot>().name(), "server_boot");
        assert_eq!(ShutdownDevice::PHASE, LifecyclePhase::Shutdown);
        assert_eq!(ShutdownDevice::NAME, "shutdown_device");
        assert_eq!(RegisterDevices::MODE, DispatchMode::FirstResult);
    }

    #[test]
    fn closures_are_phase_handlers() {
        let config = TestbedConfig::new("bench");
        let options = RunOptions::new();
        let devices = DeviceManager::builder().build();
        let ctx = PhaseContext {
            config: &config,
            options: &options,
            devices: &devices,
        };

        let failing = |_: &PhaseContext<'_>| -> Result<(), BoxError> { Err("no console".into()) };
        let error = PhaseHandler::run(&failing, &ctx).unwrap_err();
        assert_eq!(error.to_string(), "no console");
    }
}
