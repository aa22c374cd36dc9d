//! Results of a contingency check run.

use core::net::{Ipv4Addr, Ipv6Addr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ContingencyError;

/// Addresses a device holds after the interface check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeasedAddresses {
    /// IPv4 address, if one was requested and acquired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address, if one was requested and acquired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

/// Device name to acquired addresses, plus a `wan` entry for the gateway.
///
/// This is the success payload of a contingency check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceReport {
    entries: IndexMap<String, LeasedAddresses>,
}

impl InterfaceReport {
    /// Key of the WAN gateway entry.
    pub const WAN: &'static str = "wan";

    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the addresses of `device`, replacing any earlier entry.
    pub fn insert(&mut self, device: impl Into<String>, addresses: LeasedAddresses) {
        self.entries.insert(device.into(), addresses);
    }

    /// Returns the addresses recorded for `device`.
    #[must_use]
    pub fn get(&self, device: &str) -> Option<&LeasedAddresses> {
        self.entries.get(device)
    }

    /// Returns the WAN gateway addresses.
    #[must_use]
    pub fn wan(&self) -> Option<&LeasedAddresses> {
        self.get(Self::WAN)
    }

    /// Returns the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LeasedAddresses)> {
        self.entries.iter().map(|(name, addresses)| (name.as_str(), addresses))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds `other` into this report. Entries of `other` win.
    pub fn merge(&mut self, other: InterfaceReport) {
        self.entries.extend(other.entries);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ContingencyOutcome
// ─────────────────────────────────────────────────────────────────────────────

/// Session-visible verdict of a contingency check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContingencyOutcome {
    /// Every check passed. Carries the interface report.
    Passed(InterfaceReport),
    /// A check found the environment broken. Carries the check's message.
    Failed(String),
    /// A check found the test inapplicable. Carries the check's message.
    Skipped(String),
}

impl ContingencyOutcome {
    /// Classifies the result of a run.
    ///
    /// # Errors
    ///
    /// Returns fatal errors (see [`ContingencyError::is_fatal`]) unchanged.
    pub fn classify(result: Result<InterfaceReport, ContingencyError>) -> Result<Self, ContingencyError> {
        match result {
            Ok(report) => Ok(Self::Passed(report)),
            Err(ContingencyError::SkipSignal(reason)) => Ok(Self::Skipped(reason)),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => Ok(Self::Failed(error.to_string())),
        }
    }

    /// Returns true if the test body may run.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    /// Returns true if the run is reported failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if the run is reported skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns the reason a run did not pass.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Passed(_) => None,
            Self::Failed(reason) | Self::Skipped(reason) => Some(reason),
        }
    }
}
