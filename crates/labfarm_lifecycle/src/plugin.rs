//! Plugins extend a session by registering hook implementations.
//!
//! A bare [`Orchestrator`](crate::Orchestrator) does nothing: device types,
//! registration, boot logic and contingency checks all come from plugins.
//!
//! # Lifecycle
//!
//! 1. **Build** - `build()` registers hook implementations, in add order
//! 2. **Ready** - `ready()` runs once every plugin is built, in add order
//! 3. **Cleanup** - `cleanup()` runs at shutdown, in reverse add order
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use labfarm_hooks::{HookRegistry, Priority};
//! use labfarm_lifecycle::error::{BoxError, LifecycleError};
//! use labfarm_lifecycle::hooks::{DeviceBoot, PhaseContext, PhaseHandler};
//! use labfarm_lifecycle::plugin::Plugin;
//!
//! struct PowerCyclePlugin;
//!
//! impl Plugin for PowerCyclePlugin {
//!     fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
//!         let cycle: Arc<dyn PhaseHandler> = Arc::new(|_: &PhaseContext<'_>| -> Result<(), BoxError> {
//!             tracing::info!("power cycling the board");
//!             Ok(())
//!         });
//!         hooks.register::<DeviceBoot>("power_cycle", Priority::First, cycle)?;
//!         Ok(())
//!     }
//! }
//! ```

use core::any::TypeId;

use labfarm_hooks::HookRegistry;

use crate::config::TestbedConfig;
use crate::error::LifecycleError;

/// Unique identifier for a plugin type.
///
/// Used for duplicate detection. Based on [`TypeId`], so each plugin type
/// has exactly one `PluginId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PluginId {
    /// Creates a `PluginId` for the given plugin type.
    #[must_use]
    pub fn of<P: Plugin>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: core::any::type_name::<P>(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for debugging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A bundle of hook implementations added to a session.
pub trait Plugin: Send + Sync + 'static {
    /// Registers hook implementations. Called once, before any phase runs.
    ///
    /// # Errors
    ///
    /// Returns registration errors; the deployment is aborted.
    fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError>;

    /// Called after every plugin has been built.
    ///
    /// Use this for checks that depend on other plugins or on the testbed
    /// configuration.
    ///
    /// # Errors
    ///
    /// Any error aborts the deployment.
    fn ready(&self, _config: &TestbedConfig) -> Result<(), LifecycleError> {
        Ok(())
    }

    /// Called at shutdown, after devices are closed, in reverse add order.
    fn cleanup(&self, _hooks: &HookRegistry) {}

    /// Returns the plugin's name for logs and error messages.
    ///
    /// Default implementation returns the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Returns true if this plugin can only be added once.
    ///
    /// Default is `true`.
    fn is_unique(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    impl Plugin for Quiet {
        fn build(&self, _hooks: &HookRegistry) -> Result<(), LifecycleError> {
            Ok(())
        }
    }

    #[test]
    fn plugin_id_is_per_type() {
        assert_eq!(PluginId::of::<Quiet>(), PluginId::of::<Quiet>());
        assert!(PluginId::of::<Quiet>().type_name().ends_with("Quiet"));
    }

    #[test]
    fn defaults() {
        assert!(Quiet.is_unique());
        assert!(Quiet.name().ends_with("Quiet"));
        assert!(Quiet.ready(&TestbedConfig::new("bench")).is_ok());
    }
}
