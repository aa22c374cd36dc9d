//! Catalog of device types the testbed knows how to create.
//!
//! Driver crates contribute factories keyed by the inventory `type` string.
//! The registration phase merges every contribution into one
//! [`KnownDevices`] and spawns each inventory entry through it.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::device::DeviceHandle;
use crate::error::DeviceError;
use crate::role::{DeviceArray, DeviceRole};

/// Creates a device from its inventory entry.
pub type DeviceFactory = Arc<dyn Fn(&DeviceSpec) -> Result<DeviceHandle, DeviceError> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// DeviceSpec
// ─────────────────────────────────────────────────────────────────────────────

/// One device entry of the testbed inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Inventory name, usually the role the device plays (`wan`, `lan2`, `board`).
    pub name: String,
    /// Device type, matched against [`KnownDevices`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Array the device joins in addition to (or instead of) its role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<DeviceArray>,
    /// Driver-specific options.
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl DeviceSpec {
    /// Creates an entry without options.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            array: None,
            options: serde_json::Map::new(),
        }
    }

    /// Returns the role named by the entry, if its name is a role.
    #[must_use]
    pub fn role(&self) -> Option<DeviceRole> {
        self.name.parse().ok()
    }

    /// Returns a string option.
    #[must_use]
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_json::Value::as_str)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// KnownDevices
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered device type to factory catalog.
#[derive(Default, Clone)]
pub struct KnownDevices {
    factories: IndexMap<String, DeviceFactory>,
}

impl fmt::Debug for KnownDevices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnownDevices")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl KnownDevices {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DuplicateDeviceKind`] if `kind` is already known.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> Result<&mut Self, DeviceError>
    where
        F: Fn(&DeviceSpec) -> Result<DeviceHandle, DeviceError> + Send + Sync + 'static,
    {
        self.insert(kind.into(), Arc::new(factory))
    }

    /// Merges every factory of `other` into this catalog, keeping order.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DuplicateDeviceKind`] on the first kind both
    /// catalogs provide. Kinds merged before it stay merged.
    pub fn merge(&mut self, other: KnownDevices) -> Result<&mut Self, DeviceError> {
        for (kind, factory) in other.factories {
            self.insert(kind, factory)?;
        }
        Ok(self)
    }

    /// Creates the device described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnknownDeviceKind`] if no factory handles
    /// `spec.kind`, or the factory's own error.
    pub fn spawn(&self, spec: &DeviceSpec) -> Result<DeviceHandle, DeviceError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| DeviceError::UnknownDeviceKind(spec.kind.clone()))?;
        tracing::debug!(device = %spec.name, kind = %spec.kind, "spawning device");
        factory(spec)
    }

    /// Returns true if a factory handles `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Returns the known kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Returns the number of known kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no kind is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn insert(&mut self, kind: String, factory: DeviceFactory) -> Result<&mut Self, DeviceError> {
        if self.factories.contains_key(&kind) {
            return Err(DeviceError::DuplicateDeviceKind(kind));
        }
        self.factories.insert(kind, factory);
        Ok(self)
    }
}
