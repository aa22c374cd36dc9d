//! Hook specifications and their identifiers.
//!
//! A hook is declared by a zero-sized marker type implementing [`HookSpec`].
//! The marker fixes everything about the extension point at compile time:
//!
//! - its name, used in logs and errors
//! - its [`DispatchMode`]
//! - the interface implementations must satisfy ([`HookSpec::Impl`])
//! - the argument, output, and error types of a call
//!
//! Implementations never see the marker. They implement the interface trait
//! and the hook's [`invoke`](HookSpec::invoke) binds the arguments to it.
//!
//! # Example
//!
//! ```
//! use labfarm_hooks::spec::{DispatchMode, HookSpec};
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self, who: &str) -> Option<String>;
//! }
//!
//! pub struct Greet;
//!
//! impl HookSpec for Greet {
//!     const NAME: &'static str = "greet";
//!     const MODE: DispatchMode = DispatchMode::CollectAll;
//!     type Impl = dyn Greeter;
//!     type Args<'a> = &'a str;
//!     type Output = String;
//!     type Error = core::convert::Infallible;
//!
//!     fn invoke(greeter: &Self::Impl, who: &Self::Args<'_>) -> Result<Option<String>, Self::Error> {
//!         Ok(greeter.greet(who))
//!     }
//! }
//! ```

use core::any::TypeId;
use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// DispatchMode
// ─────────────────────────────────────────────────────────────────────────────

/// How a dispatch treats the results of the registered implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// Invoke every implementation and collect the non-empty results in order.
    CollectAll,
    /// Invoke implementations in order until one produces a result.
    FirstResult,
}

impl DispatchMode {
    /// Returns the mode name for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::CollectAll => "collect-all",
            DispatchMode::FirstResult => "first-result",
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Priority
// ─────────────────────────────────────────────────────────────────────────────

/// Execution tier of an implementation.
///
/// All `First` implementations run before all `Normal` ones, which run before
/// all `Last` ones. Inside a tier, implementations run in registration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Runs ahead of every normal implementation.
    First,
    /// Default tier.
    #[default]
    Normal,
    /// Runs after every normal implementation.
    Last,
}

// ─────────────────────────────────────────────────────────────────────────────
// HookSpec Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Declaration of a named extension point.
///
/// Specs are immutable: every property is an associated item of the marker
/// type, so two registries always agree on what a hook means.
pub trait HookSpec: 'static {
    /// Hook name used in logs and error messages.
    const NAME: &'static str;

    /// Whether dispatch collects every result or stops at the first one.
    const MODE: DispatchMode;

    /// Interface implementations register as, usually a trait object.
    type Impl: ?Sized + Send + Sync + 'static;

    /// Arguments passed to every implementation of a single dispatch.
    type Args<'a>;

    /// Result produced by one implementation.
    type Output;

    /// Error raised by an implementation. Dispatch propagates it unmodified.
    type Error;

    /// Calls one implementation with the dispatch arguments.
    ///
    /// `Ok(None)` is an empty result: it is skipped in collect-all mode and
    /// does not stop a first-result dispatch.
    ///
    /// # Errors
    ///
    /// Returns whatever error the implementation raises.
    fn invoke(
        implementation: &Self::Impl,
        args: &Self::Args<'_>,
    ) -> Result<Option<Self::Output>, Self::Error>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HookId
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier for a hook specification, derived from its marker type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId {
    type_id: TypeId,
    name: &'static str,
}

impl HookId {
    /// Creates the identifier of the given hook spec.
    #[must_use]
    pub fn of<S: HookSpec>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: S::NAME,
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the hook name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
