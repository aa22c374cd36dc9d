//! Error taxonomy of contingency checks.

use labfarm_devices::DeviceError;
use labfarm_hooks::HookRegistrationError;
use thiserror::Error;

/// Errors raised by a contingency check run.
///
/// Dispatch never catches these: the first one raised stops the remaining
/// checks and reaches the caller unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContingencyError {
    /// The environment is broken; the test run is reported failed.
    #[error("{0}")]
    HardCheckFailure(String),

    /// The test does not apply to this environment; the run is reported skipped.
    #[error("{0}")]
    SkipSignal(String),

    /// The setup itself is defective. Not retryable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A device lookup or driver call failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A check could not be registered in the per-invocation registry.
    #[error(transparent)]
    Registration(#[from] HookRegistrationError),
}

impl ContingencyError {
    /// Creates a [`HardCheckFailure`](Self::HardCheckFailure).
    pub fn hard_failure(message: impl Into<String>) -> Self {
        Self::HardCheckFailure(message.into())
    }

    /// Creates a [`SkipSignal`](Self::SkipSignal).
    pub fn skip(message: impl Into<String>) -> Self {
        Self::SkipSignal(message.into())
    }

    /// Returns true if the error is fatal rather than a property of the
    /// environment under test.
    ///
    /// Fatal errors are missing required devices and setup defects; they
    /// are surfaced as errors instead of a failed or skipped outcome.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::HardCheckFailure(_) | Self::SkipSignal(_) => false,
            Self::Configuration(_) | Self::Registration(_) => true,
            Self::Device(error) => {
                matches!(error, DeviceError::DeviceNotFound(_) | DeviceError::MissingCapability { .. })
                    || error.is_configuration()
            }
        }
    }
}
