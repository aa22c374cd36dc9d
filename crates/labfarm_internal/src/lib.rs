//! # labfarm Internal Library
//!
//! Re-exports the core labfarm crates for convenience.

/// Layer 1: Named hook dispatch.
pub use labfarm_hooks;

/// Layer 1: Device model and registry.
pub use labfarm_devices;

/// Layer 2: Requirement-driven contingency checks.
pub use labfarm_contingency;

/// Layer 2: Session lifecycle and orchestration.
pub use labfarm_lifecycle;

/// Layer 3: Core infrastructure plugins.
pub use labfarm_core_plugins;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use labfarm_contingency::prelude::*;
    pub use labfarm_core_plugins::{ContingencyPlugin, DefaultPlugins, TracingFormat, TracingPlugin};
    pub use labfarm_devices::prelude::*;
    pub use labfarm_hooks::prelude::*;
    pub use labfarm_lifecycle::prelude::*;
}
