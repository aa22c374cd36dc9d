//! Hook specifications of the contingency layer.
//!
//! - [`ServiceCheck`] is the inner hook: every selected check binds to it in
//!   a registry that lives for one invocation only.
//! - [`ContingencyCheck`] is the outer hook the session dispatches before a
//!   test body runs. The composer is its usual implementation.

use labfarm_devices::DeviceManager;
use labfarm_hooks::{DispatchMode, HookSpec};

use crate::error::ContingencyError;
use crate::report::InterfaceReport;
use crate::requirement::EnvironmentRequirement;

/// Arguments shared by both contingency hooks.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// Requirement declared by the test.
    pub requirement: &'a EnvironmentRequirement,
    /// Live devices of the session.
    pub devices: &'a DeviceManager,
}

impl<'a> CheckContext<'a> {
    /// Bundles a requirement with the session devices.
    #[must_use]
    pub fn new(requirement: &'a EnvironmentRequirement, devices: &'a DeviceManager) -> Self {
        Self {
            requirement,
            devices,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServiceCheck
// ─────────────────────────────────────────────────────────────────────────────

/// A single readiness check.
pub trait Check: Send + Sync {
    /// Runs the check.
    ///
    /// Returns `Ok(None)` for a silent pass, or a report to contribute to
    /// the run's payload.
    ///
    /// # Errors
    ///
    /// Returns [`ContingencyError::HardCheckFailure`] or
    /// [`ContingencyError::SkipSignal`] to stop the run, or a device error.
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError>;
}

/// Inner hook every selected check is registered under.
pub struct ServiceCheck;

impl HookSpec for ServiceCheck {
    const NAME: &'static str = "service_check";
    const MODE: DispatchMode = DispatchMode::CollectAll;
    type Impl = dyn Check;
    type Args<'a> = CheckContext<'a>;
    type Output = InterfaceReport;
    type Error = ContingencyError;

    fn invoke(check: &Self::Impl, ctx: &Self::Args<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        check.service_check(ctx)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ContingencyCheck
// ─────────────────────────────────────────────────────────────────────────────

/// Session-level contingency check implementation.
pub trait ContingencyHandler: Send + Sync {
    /// Validates the environment against `ctx.requirement`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first check that did not pass.
    fn contingency_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError>;
}

/// Outer hook dispatched by the session before each test body.
pub struct ContingencyCheck;

impl HookSpec for ContingencyCheck {
    const NAME: &'static str = "contingency_check";
    const MODE: DispatchMode = DispatchMode::CollectAll;
    type Impl = dyn ContingencyHandler;
    type Args<'a> = CheckContext<'a>;
    type Output = InterfaceReport;
    type Error = ContingencyError;

    fn invoke(
        handler: &Self::Impl,
        ctx: &Self::Args<'_>,
    ) -> Result<Option<InterfaceReport>, ContingencyError> {
        handler.contingency_check(ctx)
    }
}
