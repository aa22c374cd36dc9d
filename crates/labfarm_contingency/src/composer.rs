//! Per-invocation composition of contingency checks.
//!
//! Each call to [`ContingencyComposer::run`]:
//!
//! 1. selects checks from the requirement ([`select_checks`])
//! 2. registers a fresh instance of each into a new [`HookRegistry`]
//! 3. dispatches [`ServiceCheck`] over them in collect-all mode
//! 4. drops the registry, whether the dispatch succeeded or not
//!
//! Nothing registered during one call is visible to the next.

use labfarm_devices::DeviceManager;
use labfarm_hooks::HookRegistry;

use crate::catalog::{BuiltinChecks, CheckCatalog, CheckDescriptor, select_checks};
use crate::error::ContingencyError;
use crate::hooks::{CheckContext, ContingencyHandler, ServiceCheck};
use crate::report::{ContingencyOutcome, InterfaceReport};
use crate::requirement::EnvironmentRequirement;

/// Builds and runs the check pipeline for one requirement at a time.
#[derive(Debug, Clone, Default)]
pub struct ContingencyComposer<C = BuiltinChecks> {
    catalog: C,
}

impl ContingencyComposer {
    /// Creates a composer over the built-in checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: CheckCatalog> ContingencyComposer<C> {
    /// Creates a composer over a custom catalog.
    #[must_use]
    pub fn with_catalog(catalog: C) -> Self {
        Self { catalog }
    }

    /// Returns the catalog checks are drawn from.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Runs every check `requirement` selects, in order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first check that did not pass; later checks
    /// are not run.
    pub fn run(
        &self,
        requirement: &EnvironmentRequirement,
        devices: &DeviceManager,
    ) -> Result<InterfaceReport, ContingencyError> {
        let selected = select_checks(requirement);
        tracing::info!(
            checks = ?selected.iter().map(CheckDescriptor::as_str).collect::<Vec<_>>(),
            "executing contingency service checks"
        );

        let registry = HookRegistry::new();
        for descriptor in &selected {
            registry.register::<ServiceCheck>(
                descriptor.as_str(),
                descriptor.priority(),
                self.catalog.check(*descriptor),
            )?;
        }

        let ctx = CheckContext::new(requirement, devices);
        let outcome = registry.dispatch::<ServiceCheck>(&ctx);
        drop(registry);

        let mut report = InterfaceReport::new();
        for partial in outcome?.into_vec() {
            report.merge(partial);
        }
        Ok(report)
    }

    /// Runs the checks and classifies the result.
    ///
    /// # Errors
    ///
    /// Returns fatal errors only: a missing required device or a setup defect.
    pub fn evaluate(
        &self,
        requirement: &EnvironmentRequirement,
        devices: &DeviceManager,
    ) -> Result<ContingencyOutcome, ContingencyError> {
        let outcome = ContingencyOutcome::classify(self.run(requirement, devices));
        match &outcome {
            Ok(ContingencyOutcome::Passed(_)) => tracing::info!("contingency checks passed"),
            Ok(ContingencyOutcome::Skipped(reason)) => tracing::warn!(%reason, "contingency checks skipped the test"),
            Ok(ContingencyOutcome::Failed(reason)) => tracing::error!(%reason, "contingency checks failed"),
            Err(error) => tracing::error!(%error, "contingency checks aborted"),
        }
        outcome
    }
}

impl<C: CheckCatalog> ContingencyHandler for ContingencyComposer<C> {
    fn contingency_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        self.run(ctx.requirement, ctx.devices).map(Some)
    }
}
