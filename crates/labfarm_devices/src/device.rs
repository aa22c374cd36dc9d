//! Device handle and capability traits.
//!
//! Drivers implement [`Device`] and opt into capabilities by overriding the
//! matching `as_*` accessor. Callers reach a capability through the
//! [`DeviceManager`](crate::DeviceManager) lookups, which turn a missing
//! capability into a typed error instead of a runtime attribute failure.
//!
//! Concrete driver types stay reachable through `downcast-rs`:
//!
//! ```
//! use std::sync::Arc;
//! use labfarm_devices::{Device, DeviceError};
//!
//! struct Router;
//! impl Device for Router {
//!     fn name(&self) -> &str {
//!         "router"
//!     }
//!     fn execute(&self, _command: &str) -> Result<String, DeviceError> {
//!         Ok(String::new())
//!     }
//! }
//!
//! let handle: Arc<dyn Device> = Arc::new(Router);
//! assert!(handle.is::<Router>());
//! assert!(handle.downcast_arc::<Router>().is_ok());
//! ```

use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use core::time::Duration;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};

use crate::error::DeviceError;

/// Shared handle to a live device.
pub type DeviceHandle = Arc<dyn Device>;

// ─────────────────────────────────────────────────────────────────────────────
// Device
// ─────────────────────────────────────────────────────────────────────────────

/// A live device in the testbed.
pub trait Device: DowncastSync {
    /// Inventory name of the device.
    fn name(&self) -> &str;

    /// Runs a command on the device console and returns its output.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Command`] if the console does not respond.
    fn execute(&self, command: &str) -> Result<String, DeviceError>;

    /// Closes every connection held to the device.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be closed cleanly.
    fn close(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Returns the LAN client capability, if the device has one.
    fn as_lan_client(&self) -> Option<&dyn LanClient> {
        None
    }

    /// Returns the WAN gateway capability, if the device has one.
    fn as_wan_gateway(&self) -> Option<&dyn WanGateway> {
        None
    }

    /// Returns the ACS capability, if the device has one.
    fn as_acs_server(&self) -> Option<&dyn AcsServer> {
        None
    }

    /// Returns the CPE capability, if the device has one.
    fn as_cpe(&self) -> Option<&dyn Cpe> {
        None
    }
}

impl_downcast!(sync Device);

impl core::fmt::Debug for dyn Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device").field("name", &self.name()).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Addresses of a device's network interfaces.
pub trait InterfaceAddresses: Send + Sync {
    /// Interface facing the device under test.
    fn dut_iface(&self) -> &str;

    /// Returns the IPv4 address of `iface`, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be queried.
    fn ipv4_addr(&self, iface: &str) -> Result<Option<Ipv4Addr>, DeviceError>;

    /// Returns the global IPv6 address of `iface`, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be queried.
    fn ipv6_addr(&self, iface: &str) -> Result<Option<Ipv6Addr>, DeviceError>;
}

/// A LAN-side client container that leases addresses from the device under test.
pub trait LanClient: Send + Sync {
    /// Brings up the client's container network interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface cannot be configured.
    fn configure_docker_iface(&self) -> Result<(), DeviceError>;

    /// Requests an IPv4 lease. `prep_iface` restarts the interface first.
    ///
    /// Returns `None` when no lease was obtained.
    ///
    /// # Errors
    ///
    /// Returns an error if the DHCP client cannot be run.
    fn start_ipv4_lan_client(&self, prep_iface: bool) -> Result<Option<Ipv4Addr>, DeviceError>;

    /// Requests an IPv6 lease. `prep_iface` restarts the interface first.
    ///
    /// Returns `None` when no lease was obtained.
    ///
    /// # Errors
    ///
    /// Returns an error if the DHCPv6 client cannot be run.
    fn start_ipv6_lan_client(&self, prep_iface: bool) -> Result<Option<Ipv6Addr>, DeviceError>;

    /// Installs proxy packages once the client has an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the packages cannot be installed.
    fn configure_proxy_pkgs(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// The WAN-side server acting as the gateway of the device under test.
pub trait WanGateway: InterfaceAddresses {}

/// A TR-069 auto-configuration server.
pub trait AcsServer: InterfaceAddresses {
    /// Secondary interface facing the device under test, if any.
    fn aux_dut_iface(&self) -> Option<&str> {
        None
    }

    /// Reads one parameter from the managed device (TR-069 GPV).
    ///
    /// The call must give up once `timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the ACS cannot reach the device, or
    /// [`DeviceError::Timeout`] if no answer arrived in time.
    fn get_parameter_value(&self, parameter: &str, timeout: Duration) -> Result<String, DeviceError>;

    /// Returns true if a packet capture session is active.
    fn session_connected(&self) -> bool;
}

/// Customer premises equipment: the device under test.
pub trait Cpe: Send + Sync {
    /// Identifier the ACS uses for the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier cannot be read.
    fn cpe_id(&self) -> Result<String, DeviceError>;

    /// CWMP version reported by the firmware.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    fn cwmp_version(&self) -> Result<String, DeviceError>;

    /// Resolves `domain` with the device's resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup cannot be run.
    fn nslookup(&self, domain: &str) -> Result<Vec<IpAddr>, DeviceError>;

    /// Returns true if `address` answers a ping sent from the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the ping cannot be run.
    fn ping(&self, address: IpAddr) -> Result<bool, DeviceError>;
}
