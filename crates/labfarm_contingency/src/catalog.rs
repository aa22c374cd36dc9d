//! Check selection.
//!
//! Which checks run is decided by a static table from requirement field to
//! [`CheckDescriptor`]. [`select_checks`] walks the table in a fixed order,
//! framed by the two mandatory checks:
//!
//! ```
//! use labfarm_contingency::catalog::{select_checks, CheckDescriptor};
//! use labfarm_contingency::requirement::EnvironmentRequirement;
//!
//! let requirement = EnvironmentRequirement::new().with_multicast_server_count(2);
//! assert_eq!(
//!     select_checks(&requirement),
//!     vec![
//!         CheckDescriptor::DefaultChecks,
//!         CheckDescriptor::Multicast,
//!         CheckDescriptor::CheckInterface,
//!     ]
//! );
//! ```

use core::fmt;
use std::sync::Arc;

use labfarm_hooks::Priority;

use crate::checks::{AcsCheck, CheckInterface, CwmpCheck, DefaultChecks, DnsCheck, MulticastCheck};
use crate::hooks::Check;
use crate::requirement::EnvironmentRequirement;
use crate::retry::RetryPolicy;

// ─────────────────────────────────────────────────────────────────────────────
// CheckDescriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Named contingency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckDescriptor {
    /// Prompt responsiveness of every known device. Always runs first.
    DefaultChecks,
    /// DNS resolution and reachability of the ACS name.
    Dns,
    /// CWMP version of the firmware.
    Cwmp,
    /// ACS reachability.
    Acs,
    /// Multicast server count.
    Multicast,
    /// LAN leases and WAN gateway addresses. Always runs last.
    CheckInterface,
}

impl CheckDescriptor {
    /// Returns the check name used for registration and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckDescriptor::DefaultChecks => "DefaultChecks",
            CheckDescriptor::Dns => "DNS",
            CheckDescriptor::Cwmp => "Cwmp",
            CheckDescriptor::Acs => "ACS",
            CheckDescriptor::Multicast => "Multicast",
            CheckDescriptor::CheckInterface => "CheckInterface",
        }
    }

    /// Returns the tier the check registers in.
    #[must_use]
    pub fn priority(&self) -> Priority {
        match self {
            CheckDescriptor::CheckInterface => Priority::Last,
            _ => Priority::Normal,
        }
    }

    /// Returns true for checks selected regardless of the requirement.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        matches!(self, CheckDescriptor::DefaultChecks | CheckDescriptor::CheckInterface)
    }
}

impl fmt::Display for CheckDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional checks and the requirement field that selects each, in
/// execution order.
pub const OPTIONAL_CHECKS: [(CheckDescriptor, fn(&EnvironmentRequirement) -> bool); 4] = [
    (CheckDescriptor::Dns, EnvironmentRequirement::requires_dns),
    (CheckDescriptor::Cwmp, EnvironmentRequirement::requires_cwmp),
    (CheckDescriptor::Acs, EnvironmentRequirement::requires_tr069),
    (CheckDescriptor::Multicast, EnvironmentRequirement::requires_multicast),
];

/// Returns the checks `requirement` selects, in execution order.
///
/// `DefaultChecks` is always first and `CheckInterface` always last.
#[must_use]
pub fn select_checks(requirement: &EnvironmentRequirement) -> Vec<CheckDescriptor> {
    let mut selected = Vec::with_capacity(OPTIONAL_CHECKS.len() + 2);
    selected.push(CheckDescriptor::DefaultChecks);
    selected.extend(
        OPTIONAL_CHECKS
            .iter()
            .filter(|(_, required)| required(requirement))
            .map(|(descriptor, _)| *descriptor),
    );
    selected.push(CheckDescriptor::CheckInterface);
    selected
}

// ─────────────────────────────────────────────────────────────────────────────
// CheckCatalog
// ─────────────────────────────────────────────────────────────────────────────

/// Source of check implementations.
///
/// The composer asks the catalog for a fresh instance of every selected
/// check on each invocation.
pub trait CheckCatalog: Send + Sync {
    /// Returns an implementation of `descriptor`.
    fn check(&self, descriptor: CheckDescriptor) -> Arc<dyn Check>;
}

/// The built-in checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinChecks {
    acs_retry: RetryPolicy,
}

impl BuiltinChecks {
    /// Creates the catalog with the default ACS retry budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the retry budget of the ACS reachability call.
    #[must_use]
    pub fn with_acs_retry(mut self, policy: RetryPolicy) -> Self {
        self.acs_retry = policy;
        self
    }
}

impl CheckCatalog for BuiltinChecks {
    fn check(&self, descriptor: CheckDescriptor) -> Arc<dyn Check> {
        match descriptor {
            CheckDescriptor::DefaultChecks => Arc::new(DefaultChecks),
            CheckDescriptor::Dns => Arc::new(DnsCheck),
            CheckDescriptor::Cwmp => Arc::new(CwmpCheck),
            CheckDescriptor::Acs => Arc::new(AcsCheck::new(self.acs_retry)),
            CheckDescriptor::Multicast => Arc::new(MulticastCheck),
            CheckDescriptor::CheckInterface => Arc::new(CheckInterface),
        }
    }
}
