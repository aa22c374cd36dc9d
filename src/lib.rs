//! Hook-driven orchestration of lab testbeds.
//!
//! A session registers plugins into a hook registry, deploys the testbed
//! through its boot and configure phases, runs contingency checks before
//! each test body and shuts the devices down at the end.
//!
//! ```
//! use labfarm::prelude::*;
//!
//! let mut session = Orchestrator::new(TestbedConfig::new("bench"), RunOptions::new());
//! DefaultPlugins.add_to(&mut session).unwrap();
//! assert!(session.has_plugin::<ContingencyPlugin>());
//! ```

pub use labfarm_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use labfarm_internal::prelude::*;
}
