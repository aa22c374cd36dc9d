//! Error types for session deployment.

use labfarm_contingency::ContingencyError;
use labfarm_devices::DeviceError;
use labfarm_hooks::HookRegistrationError;
use thiserror::Error;

use crate::phase::LifecyclePhase;

/// Error raised by a phase hook implementation.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Errors raised while deploying, checking or shutting down a session.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A plugin failed to register a hook implementation.
    #[error(transparent)]
    Registration(#[from] HookRegistrationError),

    /// A unique plugin was added twice.
    #[error("plugin '{0}' is unique and was already added")]
    DuplicatePlugin(String),

    /// A plugin was added after the session was deployed.
    #[error("plugin '{0}' was added after deployment started")]
    LateRegistration(String),

    /// A phase was entered out of order or a second time.
    #[error("cannot enter phase '{phase}' after '{current}'")]
    PhaseReentry {
        /// Phase that was requested.
        phase: LifecyclePhase,
        /// Last phase the session entered.
        current: LifecyclePhase,
    },

    /// A phase hook implementation failed. Remaining phases were not run.
    #[error("phase '{phase}' failed: {source}")]
    PhaseFailed {
        /// Phase whose hook failed.
        phase: LifecyclePhase,
        /// Error raised by the implementation.
        source: BoxError,
    },

    /// No `register_devices` implementation produced a device manager.
    #[error("no plugin registered the testbed devices")]
    NoDeviceManager,

    /// The session has no live devices.
    #[error("the testbed is not deployed")]
    NotDeployed,

    /// A device lookup, spawn or driver call failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A contingency check aborted with a fatal error.
    #[error(transparent)]
    Contingency(#[from] ContingencyError),

    /// The testbed configuration does not parse.
    #[error("invalid testbed config: {0}")]
    Config(#[from] serde_json::Error),

    /// The testbed configuration cannot be read.
    #[error("cannot read testbed config '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl LifecycleError {
    /// Returns the phase a failure happened in, if any.
    #[must_use]
    pub fn phase(&self) -> Option<LifecyclePhase> {
        match self {
            Self::PhaseFailed { phase, .. } | Self::PhaseReentry { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Returns true if the error is a setup defect rather than a device or
    /// environment condition.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Registration(_)
            | Self::DuplicatePlugin(_)
            | Self::LateRegistration(_)
            | Self::NoDeviceManager
            | Self::Config(_)
            | Self::Io { .. } => true,
            Self::Device(error) => error.is_configuration(),
            Self::Contingency(error) => error.is_fatal(),
            Self::PhaseReentry { .. } | Self::PhaseFailed { .. } | Self::NotDeployed => false,
        }
    }
}
