//! Session runtime: deploys a testbed through its phases, runs contingency
//! checks against it and shuts it down.
//!
//! ```text
//! register_devices → validate_device_requirements
//!     → server_boot → server_configure
//!     → device_boot → device_configure
//!     → attached_device_boot → attached_device_configure
//!     → shutdown_device
//! ```
//!
//! Each phase dispatches its hook once. A failing phase aborts the rest of
//! the deployment; nothing is retried here. With
//! [`RunOptions::skip_boot`] only registration and validation run.

use std::time::Instant;

use hashbrown::HashSet;
use labfarm_contingency::{CheckContext, ContingencyCheck, ContingencyOutcome, EnvironmentRequirement, InterfaceReport};
use labfarm_devices::{DeviceError, DeviceManager, KnownDevices};
use labfarm_hooks::HookRegistry;

use crate::config::{RunOptions, TestbedConfig};
use crate::error::{BoxError, LifecycleError};
use crate::hooks::{
    AddDevices, AttachedDeviceBoot, AttachedDeviceConfigure, DeviceBoot, DeviceConfigure, PhaseContext, PhaseHook,
    RegisterDevices, RegistrationContext, ServerBoot, ServerConfigure, ShutdownDevice, ValidateDeviceRequirements,
};
use crate::phase::LifecyclePhase;
use crate::plugin::{Plugin, PluginId};

/// Internal entry for an added plugin.
struct PluginEntry {
    plugin: Box<dyn Plugin>,
    name: String,
}

/// Drives one testbed session.
///
/// # Example
///
/// ```
/// use labfarm_lifecycle::{InventoryRegistrar, LifecycleError, Orchestrator, Plugin, RunOptions, TestbedConfig};
/// use labfarm_hooks::{HookRegistry, Priority};
/// use std::sync::Arc;
///
/// struct Inventory;
///
/// impl Plugin for Inventory {
///     fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
///         hooks.register::<labfarm_lifecycle::hooks::RegisterDevices>(
///             "inventory",
///             Priority::Normal,
///             Arc::new(InventoryRegistrar),
///         )?;
///         Ok(())
///     }
/// }
///
/// let mut session = Orchestrator::new(TestbedConfig::new("bench"), RunOptions::new().with_skip_boot(true));
/// session.add_plugin(Inventory).unwrap();
/// let devices = session.deploy().unwrap();
/// assert!(devices.is_empty());
/// session.shutdown().unwrap();
/// ```
pub struct Orchestrator {
    config: TestbedConfig,
    options: RunOptions,
    hooks: HookRegistry,
    plugins: Vec<PluginEntry>,
    plugin_ids: HashSet<PluginId>,
    phase: Option<LifecyclePhase>,
    devices: Option<DeviceManager>,
}

impl core::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("testbed", &self.config.name)
            .field("options", &self.options)
            .field("plugins", &self.plugins.iter().map(|entry| &entry.name).collect::<Vec<_>>())
            .field("phase", &self.phase)
            .field("deployed", &self.devices.is_some())
            .finish()
    }
}

impl Orchestrator {
    /// Creates a session with no plugins.
    #[must_use]
    pub fn new(config: TestbedConfig, options: RunOptions) -> Self {
        Self {
            config,
            options,
            hooks: HookRegistry::new(),
            plugins: Vec::new(),
            plugin_ids: HashSet::new(),
            phase: None,
            devices: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a plugin. Plugins are built when [`deploy`](Self::deploy) runs.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::DuplicatePlugin`] if a unique plugin is added twice
    /// - [`LifecycleError::LateRegistration`] once deployment has started
    pub fn add_plugin<P: Plugin>(&mut self, plugin: P) -> Result<&mut Self, LifecycleError> {
        let name = plugin.name().to_string();
        if self.phase.is_some() {
            return Err(LifecycleError::LateRegistration(name));
        }

        let id = PluginId::of::<P>();
        if plugin.is_unique() && self.plugin_ids.contains(&id) {
            return Err(LifecycleError::DuplicatePlugin(name));
        }
        self.plugin_ids.insert(id);

        tracing::debug!(plugin = %name, "plugin added");
        self.plugins.push(PluginEntry {
            plugin: Box::new(plugin),
            name,
        });
        Ok(self)
    }

    /// Returns true if a plugin of type `P` was added.
    #[must_use]
    pub fn has_plugin<P: Plugin>(&self) -> bool {
        self.plugin_ids.contains(&PluginId::of::<P>())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session hook registry.
    #[must_use]
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Returns the testbed configuration.
    #[must_use]
    pub fn config(&self) -> &TestbedConfig {
        &self.config
    }

    /// Returns the run switches.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Returns the last phase entered, `None` before deployment.
    #[must_use]
    pub fn phase(&self) -> Option<LifecyclePhase> {
        self.phase
    }

    /// Returns the live devices, `None` before registration and after shutdown.
    #[must_use]
    pub fn devices(&self) -> Option<&DeviceManager> {
        self.devices.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deployment
    // ─────────────────────────────────────────────────────────────────────────

    /// Builds every plugin and runs the deployment phases.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::PhaseReentry`] if the session was already deployed
    /// - plugin build and ready errors
    /// - [`LifecycleError::NoDeviceManager`] if no plugin registered devices
    /// - [`LifecycleError::Device`] for setup defects such as an unknown
    ///   device type
    /// - [`LifecycleError::PhaseFailed`] for any other phase failure
    pub fn deploy(&mut self) -> Result<&DeviceManager, LifecycleError> {
        self.enter(LifecyclePhase::RegisterDevices)?;
        let started = Instant::now();

        for entry in &self.plugins {
            tracing::debug!(plugin = %entry.name, "building plugin");
            entry.plugin.build(&self.hooks)?;
        }
        for entry in &self.plugins {
            entry.plugin.ready(&self.config)?;
        }

        let devices = self.register_devices()?;
        self.devices = Some(devices);
        tracing::info!(
            phase = %LifecyclePhase::RegisterDevices,
            elapsed = ?started.elapsed(),
            "phase complete"
        );

        self.run_phase::<ValidateDeviceRequirements>()?;

        if self.options.skip_boot {
            tracing::info!(testbed = %self.config.name, "skip-boot: devices are used as they are");
        } else {
            self.run_phase::<ServerBoot>()?;
            self.run_phase::<ServerConfigure>()?;
            self.run_phase::<DeviceBoot>()?;
            self.run_phase::<DeviceConfigure>()?;
            self.run_phase::<AttachedDeviceBoot>()?;
            self.run_phase::<AttachedDeviceConfigure>()?;
        }

        tracing::info!(testbed = %self.config.name, elapsed = ?started.elapsed(), "testbed deployed");
        self.devices.as_ref().ok_or(LifecycleError::NotDeployed)
    }

    /// Collects known device types and asks the registrars for devices.
    fn register_devices(&self) -> Result<DeviceManager, LifecycleError> {
        let phase = LifecyclePhase::RegisterDevices;

        let mut known = KnownDevices::new();
        let catalogs = self
            .hooks
            .dispatch::<AddDevices>(&())
            .map_err(|source| phase_failed(phase, source))?;
        for catalog in catalogs.into_vec() {
            known.merge(catalog)?;
        }
        tracing::debug!(kinds = ?known.kinds().collect::<Vec<_>>(), "known device types");

        let ctx = RegistrationContext {
            config: &self.config,
            options: &self.options,
            known: &known,
            hooks: &self.hooks,
        };
        self.hooks
            .dispatch::<RegisterDevices>(&ctx)
            .map_err(|source| phase_failed(phase, source))?
            .into_first()
            .ok_or(LifecycleError::NoDeviceManager)
    }

    /// Enters and dispatches one phase hook.
    fn run_phase<H: PhaseHook>(&mut self) -> Result<(), LifecycleError> {
        self.enter(H::PHASE)?;
        let devices = self.devices.as_ref().ok_or(LifecycleError::NotDeployed)?;
        let ctx = PhaseContext {
            config: &self.config,
            options: &self.options,
            devices,
        };

        let started = Instant::now();
        H::run_all(&self.hooks, &ctx).map_err(|source| phase_failed(H::PHASE, source))?;
        tracing::info!(phase = %H::PHASE, elapsed = ?started.elapsed(), "phase complete");
        Ok(())
    }

    /// Records `phase` as the current phase.
    fn enter(&mut self, phase: LifecyclePhase) -> Result<(), LifecycleError> {
        if let Some(current) = self.phase
            && !phase.can_follow(Some(current))
        {
            return Err(LifecycleError::PhaseReentry { phase, current });
        }
        tracing::info!(testbed = %self.config.name, %phase, "entering phase");
        self.phase = Some(phase);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Contingency
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates the deployed environment against `requirement`.
    ///
    /// Dispatches the `contingency_check` hook and merges the reports of
    /// every implementation. With [`RunOptions::skip_contingency`] nothing is
    /// dispatched and the outcome is a pass with an empty report.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotDeployed`] before deployment or after shutdown
    /// - [`LifecycleError::Contingency`] for fatal check errors (a required
    ///   device is missing, the setup is defective)
    pub fn contingency_check(
        &self,
        requirement: &EnvironmentRequirement,
    ) -> Result<ContingencyOutcome, LifecycleError> {
        let devices = self.devices.as_ref().ok_or(LifecycleError::NotDeployed)?;
        if self.options.skip_contingency {
            tracing::info!("skip-contingency: contingency checks not run");
            return Ok(ContingencyOutcome::Passed(InterfaceReport::new()));
        }

        let started = Instant::now();
        let result = self
            .hooks
            .dispatch::<ContingencyCheck>(&CheckContext::new(requirement, devices))
            .map(|output| {
                output.into_vec().into_iter().fold(InterfaceReport::new(), |mut report, partial| {
                    report.merge(partial);
                    report
                })
            });

        let outcome = ContingencyOutcome::classify(result)?;
        match &outcome {
            ContingencyOutcome::Passed(report) => {
                tracing::info!(entries = report.len(), elapsed = ?started.elapsed(), "contingency check passed");
            }
            ContingencyOutcome::Failed(reason) => tracing::error!(%reason, "contingency check failed"),
            ContingencyOutcome::Skipped(reason) => tracing::warn!(%reason, "contingency check skipped the test"),
        }
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shutdown
    // ─────────────────────────────────────────────────────────────────────────

    /// Shuts the session down.
    ///
    /// Dispatches `shutdown_device`, closes every device, runs plugin cleanup
    /// in reverse add order and releases the device manager. Teardown
    /// completes even when the shutdown hook fails.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::PhaseReentry`] on a second shutdown
    /// - [`LifecycleError::PhaseFailed`] if a shutdown hook failed
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        self.enter(LifecyclePhase::Shutdown)?;

        let mut outcome = Ok(());
        if let Some(devices) = self.devices.take() {
            let ctx = PhaseContext {
                config: &self.config,
                options: &self.options,
                devices: &devices,
            };
            if let Err(source) = ShutdownDevice::run_all(&self.hooks, &ctx) {
                tracing::error!(error = %source, "shutdown hook failed, closing devices anyway");
                outcome = Err(phase_failed(LifecyclePhase::Shutdown, source));
            }

            let failures = devices.close_all();
            tracing::info!(devices = devices.len(), failures, "devices closed");
        }

        for entry in self.plugins.iter().rev() {
            tracing::debug!(plugin = %entry.name, "cleaning up plugin");
            entry.plugin.cleanup(&self.hooks);
        }

        outcome
    }
}

/// Wraps a phase hook error.
///
/// Device setup defects keep their type so callers can tell a broken
/// inventory from a broken device.
fn phase_failed(phase: LifecyclePhase, source: BoxError) -> LifecycleError {
    let source: BoxError = match source.downcast::<DeviceError>() {
        Ok(error) if error.is_configuration() => return LifecycleError::Device(*error),
        Ok(error) => error,
        Err(source) => source,
    };
    tracing::error!(%phase, error = %source, "phase failed");
    LifecycleError::PhaseFailed { phase, source }
}
