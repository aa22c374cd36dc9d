//! Requirement-driven contingency checks for labfarm (Layer 2).
//!
//! Before a test body runs, the session validates that the environment can
//! host it. The test declares an [`EnvironmentRequirement`]; the
//! [`ContingencyComposer`] turns it into an ordered pipeline of checks,
//! runs them in a registry scoped to that one call, and reports a
//! [`ContingencyOutcome`]:
//!
//! - **passed**: the test body may run; carries the [`InterfaceReport`]
//! - **failed**: a check found the environment broken
//! - **skipped**: a check found the test inapplicable to this environment
//!
//! # Check order
//!
//! `DefaultChecks` always runs first and `CheckInterface` always last. In
//! between, optional checks run in a fixed order: DNS, CWMP, ACS, multicast,
//! each only when its requirement field is present.
//!
//! # Modules
//!
//! - [`requirement`] - The requirement schema
//! - [`catalog`] - Check descriptors, the selection table and check catalogs
//! - [`checks`] - The built-in checks
//! - [`hooks`] - The `service_check` and `contingency_check` hook specifications
//! - [`composer`] - Per-invocation pipeline assembly
//! - [`report`] - Success payload and outcome classification
//! - [`retry`] - Bounded retry of transient device calls

pub mod catalog;
pub mod checks;
pub mod composer;
pub mod error;
pub mod hooks;
pub mod report;
pub mod requirement;
pub mod retry;

pub use catalog::{BuiltinChecks, CheckCatalog, CheckDescriptor, select_checks};
pub use composer::ContingencyComposer;
pub use error::ContingencyError;
pub use hooks::{Check, CheckContext, ContingencyCheck, ContingencyHandler, ServiceCheck};
pub use report::{ContingencyOutcome, InterfaceReport, LeasedAddresses};
pub use requirement::{
    AddressFamily, DnsReachability, DnsServerRequirement, EnvironmentRequirement, ProvisioningMode,
    ReachabilityCounts, Tr069Requirement,
};
pub use retry::RetryPolicy;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::composer::*;
    pub use crate::error::*;
    pub use crate::hooks::*;
    pub use crate::report::*;
    pub use crate::requirement::*;
    pub use crate::retry::*;
}
