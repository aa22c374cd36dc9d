//! Typed hook registry for labfarm (Layer 1).
//!
//! `labfarm_hooks` provides the named-dispatch mechanism every other labfarm
//! crate is built on:
//!
//! - [`spec`] - Hook specifications, identifiers, priorities and dispatch modes
//! - [`registry`] - Registration and dispatch of hook implementations
//!
//! # Architecture
//!
//! - **Layer 1** (`labfarm_hooks`, `labfarm_devices`): dispatch and device primitives
//! - **Layer 2** (`labfarm_lifecycle`, `labfarm_contingency`): phase sequencing and readiness checks
//! - **Layer 3** (plugins): device drivers, infrastructure plugins

/// Hook specifications and identifiers.
pub mod spec;

/// Hook registration and dispatch.
pub mod registry;

pub use registry::{HookOutput, HookRegistrationError, HookRegistry};
pub use spec::{DispatchMode, HookId, HookSpec, Priority};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::registry::*;
    pub use crate::spec::*;
}
