//! Device roles, capability traits and the session device manager for labfarm (Layer 1).
//!
//! - [`role`] - Roles, device arrays and inventory expressions
//! - [`device`] - The [`Device`] handle trait and its opt-in capabilities
//! - [`manager`] - Role bindings frozen for the duration of a session
//! - [`known`] - Catalog of device types and their factories
//! - [`error`] - [`DeviceError`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use labfarm_devices::prelude::*;
//!
//! struct Server(&'static str);
//! impl Device for Server {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//!     fn execute(&self, command: &str) -> Result<String, DeviceError> {
//!         Ok(command.to_string())
//!     }
//! }
//!
//! let mut builder = DeviceManager::builder();
//! builder.bind(DeviceRole::Wan, Arc::new(Server("wan")))?;
//! let devices = builder.build();
//!
//! assert_eq!(devices.by_type(DeviceRole::Wan)?.name(), "wan");
//! assert!(devices.get(DeviceRole::Lan2).is_none());
//! assert_eq!(
//!     devices.by_type(DeviceRole::Provisioner).unwrap_err(),
//!     DeviceError::DeviceNotFound(DeviceRole::Provisioner)
//! );
//! # Ok::<(), DeviceError>(())
//! ```

pub mod device;
pub mod error;
pub mod known;
pub mod manager;
pub mod role;

pub use device::{AcsServer, Cpe, Device, DeviceHandle, InterfaceAddresses, LanClient, WanGateway};
pub use error::DeviceError;
pub use known::{DeviceFactory, DeviceSpec, KnownDevices};
pub use manager::{DeviceManager, DeviceManagerBuilder, SessionIds};
pub use role::{DeviceArray, DeviceRole, DeviceSelector};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::device::*;
    pub use crate::error::*;
    pub use crate::known::*;
    pub use crate::manager::*;
    pub use crate::role::*;
}
