//! Hook registration and dispatch.
//!
//! The [`HookRegistry`] stores implementations per hook spec and dispatches
//! calls to them in a stable, caller-predictable order.
//!
//! # Ordering
//!
//! Implementations are grouped into [`Priority`] tiers. Within a tier the
//! execution order equals the registration order; the most recently
//! registered implementation never jumps the queue.
//!
//! # Dispatch
//!
//! - [`DispatchMode::CollectAll`]: every implementation runs, non-empty results
//!   are collected in order. The first error stops the dispatch and is
//!   returned to the caller untouched.
//! - [`DispatchMode::FirstResult`]: implementations run until one returns a
//!   non-empty result; the rest are never invoked.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use labfarm_hooks::registry::HookRegistry;
//! use labfarm_hooks::spec::{DispatchMode, HookSpec, Priority};
//!
//! pub trait Probe: Send + Sync {
//!     fn probe(&self) -> Option<&'static str>;
//! }
//!
//! struct Fixed(&'static str);
//! impl Probe for Fixed {
//!     fn probe(&self) -> Option<&'static str> {
//!         Some(self.0)
//!     }
//! }
//!
//! struct ProbeAll;
//! impl HookSpec for ProbeAll {
//!     const NAME: &'static str = "probe_all";
//!     const MODE: DispatchMode = DispatchMode::CollectAll;
//!     type Impl = dyn Probe;
//!     type Args<'a> = ();
//!     type Output = &'static str;
//!     type Error = core::convert::Infallible;
//!
//!     fn invoke(probe: &Self::Impl, _: &()) -> Result<Option<&'static str>, Self::Error> {
//!         Ok(probe.probe())
//!     }
//! }
//!
//! let registry = HookRegistry::new();
//! registry
//!     .register::<ProbeAll>("late", Priority::Last, Arc::new(Fixed("late")))?
//!     .register::<ProbeAll>("early", Priority::Normal, Arc::new(Fixed("early")))?;
//!
//! let results = registry.dispatch::<ProbeAll>(&()).unwrap().into_vec();
//! assert_eq!(results, vec!["early", "late"]);
//! # Ok::<(), labfarm_hooks::registry::HookRegistrationError>(())
//! ```

use core::any::Any;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::spec::{DispatchMode, HookId, HookSpec, Priority};

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistrationError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during hook registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookRegistrationError {
    /// The implementation name or instance is already bound to the hook.
    #[error("implementation '{name}' already registered for hook '{hook}'")]
    DuplicateRegistration {
        /// The hook where the duplicate was found.
        hook: HookId,
        /// The name of the rejected registration.
        name: String,
    },

    /// The stored implementation list of the hook has an unexpected type.
    #[error("implementation list of hook '{hook}' has an unexpected type")]
    StorageMismatch {
        /// The hook whose storage is inconsistent.
        hook: HookId,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// HookOutput
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a successful dispatch, shaped by the hook's [`DispatchMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutput<T> {
    /// Ordered non-empty results of a collect-all dispatch.
    Collected(Vec<T>),
    /// The first non-empty result of a first-result dispatch, if any.
    First(Option<T>),
}

impl<T> HookOutput<T> {
    /// Converts the output into an ordered list of results.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            HookOutput::Collected(results) => results,
            HookOutput::First(result) => result.into_iter().collect(),
        }
    }

    /// Returns the first result, whatever the dispatch mode.
    #[must_use]
    pub fn into_first(self) -> Option<T> {
        match self {
            HookOutput::Collected(results) => results.into_iter().next(),
            HookOutput::First(result) => result,
        }
    }

    /// Returns true if no implementation produced a result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            HookOutput::Collected(results) => results.is_empty(),
            HookOutput::First(result) => result.is_none(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Entry in the hook registry.
struct HookEntry<I: ?Sized> {
    /// Name used for duplicate detection, unregistration and logging.
    name: String,
    /// Execution tier.
    priority: Priority,
    /// The implementation itself.
    implementation: Arc<I>,
}

/// Entries of one hook, kept sorted by tier then registration order.
type HookList<I> = Vec<HookEntry<I>>;

/// Type-erased [`HookList`] for storage keyed by [`HookId`].
type BoxedHookList = Box<dyn Any + Send + Sync>;

/// Returns true if two `Arc`s point to the same allocation.
///
/// Compares data pointers only so trait objects with distinct vtables for the
/// same value still count as the same instance.
fn same_instance<I: ?Sized>(a: &Arc<I>, b: &Arc<I>) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// ─────────────────────────────────────────────────────────────────────────────
// HookRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of hook implementations, keyed by hook spec.
///
/// # Thread Safety
///
/// The registry uses interior mutability via [`RwLock`] so plugins can
/// register through a shared reference. Dispatch snapshots the implementation
/// list before invoking anything, so an implementation may register or
/// unregister hooks without deadlocking.
///
/// # Scoping
///
/// A registry is an ordinary value. Create one per scope that needs its own
/// bindings and drop it when the scope ends; nothing is stored globally.
#[derive(Default)]
pub struct HookRegistry {
    /// Maps hook ID to its (type-erased) list of entries.
    hooks: RwLock<HashMap<HookId, BoxedHookList>>,
}

impl core::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let hooks = self.hooks.read();
        let mut names: Vec<&'static str> = hooks.keys().map(HookId::name).collect();
        names.sort_unstable();
        f.debug_struct("HookRegistry").field("hooks", &names).finish()
    }
}

impl HookRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an implementation for hook `S`.
    ///
    /// The implementation is placed after every existing implementation of
    /// the same or an earlier tier, and before every implementation of a
    /// later tier.
    ///
    /// # Errors
    ///
    /// Returns [`HookRegistrationError::DuplicateRegistration`] if `name` is
    /// already registered for `S`, or if the same `Arc` instance is already
    /// registered for `S` under another name.
    pub fn register<S: HookSpec>(
        &self,
        name: impl Into<String>,
        priority: Priority,
        implementation: Arc<S::Impl>,
    ) -> Result<&Self, HookRegistrationError> {
        let name = name.into();
        let mut hooks = self.hooks.write();
        let entries = Self::entries_mut::<S>(&mut hooks)?;

        if entries
            .iter()
            .any(|entry| entry.name == name || same_instance(&entry.implementation, &implementation))
        {
            return Err(HookRegistrationError::DuplicateRegistration {
                hook: HookId::of::<S>(),
                name,
            });
        }

        let position = entries
            .iter()
            .position(|entry| entry.priority > priority)
            .unwrap_or(entries.len());

        tracing::trace!(
            hook = S::NAME,
            implementation = %name,
            ?priority,
            position,
            "hook implementation registered"
        );

        entries.insert(
            position,
            HookEntry {
                name,
                priority,
                implementation,
            },
        );
        Ok(self)
    }

    /// Removes the implementation registered under `name` for hook `S`.
    ///
    /// Returns the removed implementation, or `None` if nothing was bound
    /// under that name.
    pub fn unregister<S: HookSpec>(&self, name: &str) -> Option<Arc<S::Impl>> {
        let mut hooks = self.hooks.write();
        let id = HookId::of::<S>();
        let entries = hooks.get_mut(&id)?.downcast_mut::<HookList<S::Impl>>()?;
        let index = entries.iter().position(|entry| entry.name == name)?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            hooks.remove(&id);
        }
        Some(removed.implementation)
    }

    /// Removes every implementation of hook `S`.
    pub fn clear<S: HookSpec>(&self) {
        self.hooks.write().remove(&HookId::of::<S>());
    }

    /// Removes every implementation of every hook.
    pub fn clear_all(&self) {
        self.hooks.write().clear();
    }

    /// Invokes the implementations of hook `S` with `args`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an implementation. Implementations
    /// after the failing one are not invoked and earlier results are dropped.
    pub fn dispatch<S: HookSpec>(
        &self,
        args: &S::Args<'_>,
    ) -> Result<HookOutput<S::Output>, S::Error> {
        let snapshot = self.snapshot::<S>();

        tracing::debug!(
            hook = S::NAME,
            mode = %S::MODE,
            implementations = snapshot.len(),
            "dispatching hook"
        );

        match S::MODE {
            DispatchMode::CollectAll => {
                let mut results = Vec::with_capacity(snapshot.len());
                for (name, implementation) in &snapshot {
                    tracing::trace!(hook = S::NAME, implementation = %name, "invoking");
                    if let Some(result) = S::invoke(implementation, args)? {
                        results.push(result);
                    }
                }
                Ok(HookOutput::Collected(results))
            }
            DispatchMode::FirstResult => {
                for (name, implementation) in &snapshot {
                    tracing::trace!(hook = S::NAME, implementation = %name, "invoking");
                    if let Some(result) = S::invoke(implementation, args)? {
                        tracing::debug!(
                            hook = S::NAME,
                            implementation = %name,
                            "first result produced"
                        );
                        return Ok(HookOutput::First(Some(result)));
                    }
                }
                Ok(HookOutput::First(None))
            }
        }
    }

    /// Returns the number of implementations registered for hook `S`.
    #[must_use]
    pub fn hook_count<S: HookSpec>(&self) -> usize {
        let hooks = self.hooks.read();
        Self::entries::<S>(&hooks).map_or(0, Vec::len)
    }

    /// Checks if an implementation with the given name exists for hook `S`.
    #[must_use]
    pub fn contains<S: HookSpec>(&self, name: &str) -> bool {
        let hooks = self.hooks.read();
        Self::entries::<S>(&hooks)
            .is_some_and(|entries| entries.iter().any(|entry| entry.name == name))
    }

    /// Returns the implementation names of hook `S` in execution order.
    #[must_use]
    pub fn implementation_names<S: HookSpec>(&self) -> Vec<String> {
        let hooks = self.hooks.read();
        Self::entries::<S>(&hooks)
            .map(|entries| entries.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns true if no implementation is registered for any hook.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Lists are removed as soon as they become empty.
        self.hooks.read().is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn snapshot<S: HookSpec>(&self) -> Vec<(String, Arc<S::Impl>)> {
        let hooks = self.hooks.read();
        Self::entries::<S>(&hooks)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| (entry.name.clone(), Arc::clone(&entry.implementation)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A list of the wrong type reads as empty.
    fn entries<S: HookSpec>(hooks: &HashMap<HookId, BoxedHookList>) -> Option<&HookList<S::Impl>> {
        let entries = hooks.get(&HookId::of::<S>())?.downcast_ref::<HookList<S::Impl>>();
        if entries.is_none() {
            tracing::error!(hook = S::NAME, "implementation list has an unexpected type");
        }
        entries
    }

    fn entries_mut<S: HookSpec>(
        hooks: &mut HashMap<HookId, BoxedHookList>,
    ) -> Result<&mut HookList<S::Impl>, HookRegistrationError> {
        hooks
            .entry(HookId::of::<S>())
            .or_insert_with(|| Box::new(HookList::<S::Impl>::new()))
            .downcast_mut::<HookList<S::Impl>>()
            .ok_or(HookRegistrationError::StorageMismatch {
                hook: HookId::of::<S>(),
            })
    }
}
