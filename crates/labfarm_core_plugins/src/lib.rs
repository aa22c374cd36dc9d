//! Core infrastructure plugins for labfarm.
//!
//! This crate provides the plugins most sessions need:
//!
//! - [`TracingPlugin`] - Logging and observability via the `tracing` crate
//! - [`ContingencyPlugin`] - Requirement-driven environment checks before each test
//! - [`DefaultPlugins`] - Adds both to an orchestrator
//!
//! # Example
//!
//! ```
//! use labfarm_core_plugins::{ContingencyPlugin, TracingPlugin};
//! use labfarm_lifecycle::{Orchestrator, RunOptions, TestbedConfig};
//! use tracing::Level;
//!
//! let mut session = Orchestrator::new(TestbedConfig::new("bench"), RunOptions::new());
//! session
//!     .add_plugin(TracingPlugin::default().with_level(Level::DEBUG))
//!     .unwrap()
//!     .add_plugin(ContingencyPlugin::new())
//!     .unwrap();
//! ```
//!
//! # Architecture
//!
//! This crate is part of Layer 3:
//!
//! - **Layer 1** (`labfarm_hooks`, `labfarm_devices`): Dispatch and device primitives
//! - **Layer 2** (`labfarm_contingency`, `labfarm_lifecycle`): Checks and session runtime
//! - **Layer 3** (`labfarm_core_plugins`): Concrete plugins

mod contingency_plugin;
mod tracing_plugin;

use labfarm_lifecycle::{LifecycleError, Orchestrator};

pub use contingency_plugin::{CONTINGENCY_HANDLER, ContingencyPlugin};
pub use tracing_plugin::{TracingConfig, TracingFormat, TracingPlugin};

/// Default plugin bundle: [`TracingPlugin`] and [`ContingencyPlugin`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPlugins;

impl DefaultPlugins {
    /// Adds the bundle to `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if either plugin was already added or the session
    /// has started deploying.
    pub fn add_to(self, session: &mut Orchestrator) -> Result<(), LifecycleError> {
        session
            .add_plugin(TracingPlugin::default())?
            .add_plugin(ContingencyPlugin::new())?;
        Ok(())
    }
}
