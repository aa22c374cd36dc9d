//! Session device manager.
//!
//! Roles are bound once, through a [`DeviceManagerBuilder`], during the
//! registration phase. [`DeviceManagerBuilder::build`] freezes the bindings
//! into a [`DeviceManager`] that only offers lookups for the rest of the
//! session. Lookups never create devices.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::device::{AcsServer, Cpe, Device, DeviceHandle, LanClient, WanGateway};
use crate::error::DeviceError;
use crate::role::{DeviceArray, DeviceRole, DeviceSelector};

const SESSION_ALPHABET: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

fn same_handle(a: &DeviceHandle, b: &DeviceHandle) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionIds
// ─────────────────────────────────────────────────────────────────────────────

/// Identifiers unique to one testbed session.
///
/// Interface names derived from the session id keep containers of parallel
/// sessions on one host from colliding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIds {
    /// 15 hexadecimal characters.
    pub session_id: String,
    /// WAN container interface name.
    pub wan_iface: String,
    /// LAN container interface name.
    pub lan_iface: String,
}

impl SessionIds {
    /// Generates a fresh set of identifiers.
    #[must_use]
    pub fn generate() -> Self {
        let session_id = nanoid::nanoid!(15, &SESSION_ALPHABET);
        let prefix = &session_id[..12];
        Self {
            wan_iface: format!("wan{prefix}"),
            lan_iface: format!("lan{prefix}"),
            session_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DeviceManagerBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Collects role bindings during the registration phase.
#[derive(Default)]
pub struct DeviceManagerBuilder {
    roles: IndexMap<DeviceRole, DeviceHandle>,
    arrays: IndexMap<DeviceArray, Vec<DeviceHandle>>,
}

impl fmt::Debug for DeviceManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceManagerBuilder")
            .field("roles", &self.roles.keys().collect::<Vec<_>>())
            .field("arrays", &self.arrays.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DeviceManagerBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `device` to `role`.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::DuplicateRole`] if the role is already bound.
    /// - [`DeviceError::AliasedHandle`] if the same handle is bound to another role.
    pub fn bind(&mut self, role: DeviceRole, device: DeviceHandle) -> Result<&mut Self, DeviceError> {
        if self.roles.contains_key(&role) {
            return Err(DeviceError::DuplicateRole(role));
        }
        if let Some((existing, _)) = self
            .roles
            .iter()
            .find(|(_, bound)| same_handle(bound, &device))
        {
            return Err(DeviceError::AliasedHandle {
                device: device.name().to_string(),
                existing: *existing,
                requested: role,
            });
        }

        tracing::debug!(%role, device = device.name(), "device bound");
        self.roles.insert(role, device);
        Ok(self)
    }

    /// Appends `device` to `array`.
    ///
    /// A device may be both bound to a role and a member of arrays.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DuplicateArrayMember`] if the handle is already
    /// in the array.
    pub fn push(&mut self, array: DeviceArray, device: DeviceHandle) -> Result<&mut Self, DeviceError> {
        let members = self.arrays.entry(array).or_default();
        if members.iter().any(|member| same_handle(member, &device)) {
            return Err(DeviceError::DuplicateArrayMember {
                device: device.name().to_string(),
                array,
            });
        }

        tracing::debug!(%array, index = members.len(), device = device.name(), "device added to array");
        members.push(device);
        Ok(self)
    }

    /// Returns true if `role` is already bound.
    #[must_use]
    pub fn is_bound(&self, role: DeviceRole) -> bool {
        self.roles.contains_key(&role)
    }

    /// Freezes the bindings into a [`DeviceManager`] with fresh session ids.
    #[must_use]
    pub fn build(self) -> DeviceManager {
        let session = SessionIds::generate();
        tracing::info!(
            session_id = %session.session_id,
            roles = self.roles.len(),
            arrays = self.arrays.len(),
            "device manager ready"
        );
        DeviceManager {
            roles: self.roles,
            arrays: self.arrays,
            session,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DeviceManager
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable role-to-device bindings of one session.
pub struct DeviceManager {
    roles: IndexMap<DeviceRole, DeviceHandle>,
    arrays: IndexMap<DeviceArray, Vec<DeviceHandle>>,
    session: SessionIds,
}

impl fmt::Debug for DeviceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceManager")
            .field("session_id", &self.session.session_id)
            .field(
                "roles",
                &self
                    .roles
                    .iter()
                    .map(|(role, device)| (role.as_str(), device.name()))
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl DeviceManager {
    /// Starts a new registration.
    #[must_use]
    pub fn builder() -> DeviceManagerBuilder {
        DeviceManagerBuilder::new()
    }

    /// Returns the device bound to a required role.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DeviceNotFound`] if nothing is bound to `role`.
    pub fn by_type(&self, role: DeviceRole) -> Result<DeviceHandle, DeviceError> {
        self.get(role).ok_or(DeviceError::DeviceNotFound(role))
    }

    /// Returns the device bound to an optional role.
    #[must_use]
    pub fn get(&self, role: DeviceRole) -> Option<DeviceHandle> {
        self.roles.get(&role).cloned()
    }

    /// Returns the devices bound to `roles`, in the requested order.
    ///
    /// Unbound roles are skipped.
    #[must_use]
    pub fn by_types(&self, roles: &[DeviceRole]) -> Vec<DeviceHandle> {
        roles.iter().filter_map(|role| self.get(*role)).collect()
    }

    /// Returns the device bound to `role` as its concrete driver type.
    ///
    /// # Errors
    ///
    /// - [`DeviceError::DeviceNotFound`] if nothing is bound to `role`.
    /// - [`DeviceError::TypeMismatch`] if the bound device is not a `T`.
    pub fn by_type_as<T: Device>(&self, role: DeviceRole) -> Result<Arc<T>, DeviceError> {
        self.by_type(role)?
            .downcast_arc::<T>()
            .map_err(|device| DeviceError::TypeMismatch {
                role,
                device: device.name().to_string(),
                expected: core::any::type_name::<T>(),
            })
    }

    /// Returns true if `role` is bound.
    #[must_use]
    pub fn contains(&self, role: DeviceRole) -> bool {
        self.roles.contains_key(&role)
    }

    /// Returns the bound roles in registration order.
    pub fn roles(&self) -> impl Iterator<Item = DeviceRole> + '_ {
        self.roles.keys().copied()
    }

    /// Returns the number of bound roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if no role is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Capabilities
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the LAN client capability of the device bound to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DeviceNotFound`] or [`DeviceError::MissingCapability`].
    pub fn lan_client(&self, role: DeviceRole) -> Result<&dyn LanClient, DeviceError> {
        self.capability(role, "LAN client", |device| device.as_lan_client())
    }

    /// Returns the WAN gateway capability of the device bound to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DeviceNotFound`] or [`DeviceError::MissingCapability`].
    pub fn wan_gateway(&self, role: DeviceRole) -> Result<&dyn WanGateway, DeviceError> {
        self.capability(role, "WAN gateway", |device| device.as_wan_gateway())
    }

    /// Returns the ACS capability of the device bound to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DeviceNotFound`] or [`DeviceError::MissingCapability`].
    pub fn acs_server(&self, role: DeviceRole) -> Result<&dyn AcsServer, DeviceError> {
        self.capability(role, "ACS", |device| device.as_acs_server())
    }

    /// Returns the CPE capability of the device bound to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DeviceNotFound`] or [`DeviceError::MissingCapability`].
    pub fn cpe(&self, role: DeviceRole) -> Result<&dyn Cpe, DeviceError> {
        self.capability(role, "CPE", |device| device.as_cpe())
    }

    fn capability<'a, C: ?Sized + 'a>(
        &'a self,
        role: DeviceRole,
        capability: &'static str,
        project: impl FnOnce(&'a dyn Device) -> Option<&'a C>,
    ) -> Result<&'a C, DeviceError> {
        let device = self
            .roles
            .get(&role)
            .ok_or(DeviceError::DeviceNotFound(role))?;
        project(device.as_ref()).ok_or_else(|| DeviceError::MissingCapability {
            role,
            device: device.name().to_string(),
            capability,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Arrays
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the members of `array`, empty if none were added.
    #[must_use]
    pub fn array(&self, array: DeviceArray) -> &[DeviceHandle] {
        self.arrays.get(&array).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resolves an inventory expression: a role name or `array[index]`.
    ///
    /// # Errors
    ///
    /// Returns a parse error for a malformed expression,
    /// [`DeviceError::DeviceNotFound`] for an unbound role, or
    /// [`DeviceError::NoSuchDevice`] for an out-of-range index.
    pub fn by_name(&self, expression: &str) -> Result<DeviceHandle, DeviceError> {
        match expression.parse::<DeviceSelector>()? {
            DeviceSelector::Role(role) => self.by_type(role),
            DeviceSelector::Member(array, index) => self
                .array(array)
                .get(index)
                .cloned()
                .ok_or_else(|| DeviceError::NoSuchDevice(expression.to_string())),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the identifiers of this session.
    #[must_use]
    pub fn session(&self) -> &SessionIds {
        &self.session
    }

    /// Closes every distinct device held by the manager.
    ///
    /// A device that fails to close is logged and skipped. Returns the
    /// number of failures.
    pub fn close_all(&self) -> usize {
        let mut closed: Vec<&DeviceHandle> = Vec::new();
        let mut failures = 0;

        let every = self
            .roles
            .values()
            .chain(self.arrays.values().flatten());

        for device in every {
            if closed.iter().any(|seen| same_handle(seen, device)) {
                continue;
            }
            closed.push(device);

            tracing::debug!(device = device.name(), "closing connection");
            if let Err(error) = device.close() {
                failures += 1;
                tracing::warn!(device = device.name(), %error, "problem closing connection");
            }
        }
        failures
    }
}
