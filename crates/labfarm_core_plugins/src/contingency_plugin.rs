//! Contingency check plugin.
//!
//! Registers the [`ContingencyComposer`] as the session's
//! [`ContingencyCheck`] handler. The handler is registered with
//! [`Priority::First`] so that the environment is validated before any
//! other contingency handler a plugin contributes.

use std::sync::Arc;

use labfarm_contingency::{BuiltinChecks, CheckCatalog, ContingencyCheck, ContingencyComposer, RetryPolicy};
use labfarm_hooks::{HookRegistry, Priority};
use labfarm_lifecycle::{LifecycleError, Plugin};

/// Handler name the composer is registered under.
pub const CONTINGENCY_HANDLER: &str = "contingency";

/// Plugin contributing the requirement-driven contingency checks.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use labfarm_contingency::RetryPolicy;
/// use labfarm_core_plugins::ContingencyPlugin;
///
/// let plugin = ContingencyPlugin::new().with_acs_retry(RetryPolicy::new(3, Duration::from_secs(5)));
/// ```
#[derive(Debug)]
pub struct ContingencyPlugin<C = BuiltinChecks> {
    composer: Arc<ContingencyComposer<C>>,
}

impl Default for ContingencyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ContingencyPlugin {
    /// Creates the plugin over the built-in checks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            composer: Arc::new(ContingencyComposer::new()),
        }
    }

    /// Overrides the retry budget of the ACS reachability call.
    #[must_use]
    pub fn with_acs_retry(self, policy: RetryPolicy) -> Self {
        let catalog = self.composer.catalog().with_acs_retry(policy);
        Self {
            composer: Arc::new(ContingencyComposer::with_catalog(catalog)),
        }
    }
}

impl<C: CheckCatalog + 'static> ContingencyPlugin<C> {
    /// Creates the plugin over a custom check catalog.
    #[must_use]
    pub fn with_catalog(catalog: C) -> Self {
        Self {
            composer: Arc::new(ContingencyComposer::with_catalog(catalog)),
        }
    }

    /// Returns the composer the plugin registers.
    #[must_use]
    pub fn composer(&self) -> &ContingencyComposer<C> {
        &self.composer
    }
}

impl<C: CheckCatalog + 'static> Plugin for ContingencyPlugin<C> {
    fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
        hooks.register::<ContingencyCheck>(CONTINGENCY_HANDLER, Priority::First, Arc::<ContingencyComposer<C>>::clone(&self.composer))?;
        tracing::debug!(handler = CONTINGENCY_HANDLER, "contingency checks registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn build_registers_the_composer_once() {
        let hooks = HookRegistry::new();
        let plugin = ContingencyPlugin::new();
        plugin.build(&hooks).unwrap();

        assert_eq!(hooks.implementation_names::<ContingencyCheck>(), vec![CONTINGENCY_HANDLER]);
        assert!(plugin.build(&hooks).is_err());
    }

    #[test]
    fn acs_retry_reaches_the_catalog() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let plugin = ContingencyPlugin::new().with_acs_retry(policy);
        assert_eq!(
            format!("{:?}", plugin.composer().catalog()),
            format!("{:?}", BuiltinChecks::new().with_acs_retry(policy))
        );
    }
}
