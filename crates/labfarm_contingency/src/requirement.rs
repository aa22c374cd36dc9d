//! Environment requirements declared by a test.
//!
//! Every field is optional and absence means "not required". Presence checks
//! are direct field tests; there is no search through nested maps.
//!
//! ```
//! use labfarm_contingency::requirement::{EnvironmentRequirement, ProvisioningMode};
//!
//! let requirement: EnvironmentRequirement = serde_json::from_str(
//!     r#"{"dns": [{"ACS_SERVER": {"ipv4": [{"reachable": 2, "unreachable": 0}]}}],
//!         "provisioning_mode": "ipv4"}"#,
//! )?;
//!
//! assert!(requirement.requires_dns());
//! assert_eq!(requirement.provisioning_mode(), ProvisioningMode::Ipv4);
//! assert!(requirement.lan_dhcpv4());
//! # Ok::<(), serde_json::Error>(())
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Provisioning
// ─────────────────────────────────────────────────────────────────────────────

/// Address families the device under test is provisioned with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisioningMode {
    /// IPv4 only.
    Ipv4,
    /// IPv6 only.
    Ipv6,
    /// IPv4 and IPv6.
    #[default]
    Dual,
    /// No WAN addressing.
    None,
}

impl ProvisioningMode {
    /// Returns the mode name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningMode::Ipv4 => "ipv4",
            ProvisioningMode::Ipv6 => "ipv6",
            ProvisioningMode::Dual => "dual",
            ProvisioningMode::None => "none",
        }
    }

    /// Returns true if LAN clients are expected to obtain IPv6 leases.
    #[must_use]
    pub fn leases_ipv6(&self) -> bool {
        matches!(self, ProvisioningMode::Ipv6 | ProvisioningMode::Dual)
    }
}

impl fmt::Display for ProvisioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4.
    Ipv4,
    /// IPv6.
    Ipv6,
}

impl AddressFamily {
    /// Returns the family name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DNS
// ─────────────────────────────────────────────────────────────────────────────

/// Expected ping results for the addresses a name resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityCounts {
    /// Addresses that must answer.
    #[serde(default)]
    pub reachable: u32,
    /// Addresses that must not answer.
    #[serde(default)]
    pub unreachable: u32,
}

impl ReachabilityCounts {
    /// Creates a count pair.
    #[must_use]
    pub const fn new(reachable: u32, unreachable: u32) -> Self {
        Self {
            reachable,
            unreachable,
        }
    }
}

/// Saturates at `u32::MAX`; an oversized requirement fails the comparison
/// instead of overflowing.
impl core::ops::Add for ReachabilityCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.reachable.saturating_add(rhs.reachable),
            self.unreachable.saturating_add(rhs.unreachable),
        )
    }
}

/// Per-family reachability expectations for one server name.
///
/// In `dual` provisioning mode the DNS check compares the observed counts
/// against the sum of the `ipv4` and `ipv6` expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsReachability {
    /// IPv4 expectations. Only the first entry is used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv4: Vec<ReachabilityCounts>,
    /// IPv6 expectations. Only the first entry is used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6: Vec<ReachabilityCounts>,
}

impl DnsReachability {
    /// Returns the expectation for `family`, zero if none was given.
    #[must_use]
    pub fn counts(&self, family: AddressFamily) -> ReachabilityCounts {
        let entries = match family {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        };
        entries.first().copied().unwrap_or_default()
    }
}

/// One DNS server descriptor of a requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsServerRequirement {
    /// Expectations for the ACS server name.
    #[serde(rename = "ACS_SERVER", default, skip_serializing_if = "Option::is_none")]
    pub acs_server: Option<DnsReachability>,
}

// ─────────────────────────────────────────────────────────────────────────────
// TR-069
// ─────────────────────────────────────────────────────────────────────────────

/// TR-069 management requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tr069Requirement {
    /// Requires an active packet capture session on the ACS.
    #[serde(default)]
    pub packet_analysis: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// EnvironmentRequirement
// ─────────────────────────────────────────────────────────────────────────────

/// What a test needs from the environment before its body may run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRequirement {
    /// DNS server descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<Vec<DnsServerRequirement>>,

    /// CWMP version the firmware must report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwmp_version: Option<String>,

    /// TR-069 management requirements.
    #[serde(
        rename = "tr-069",
        alias = "tr069",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tr069: Option<Tr069Requirement>,

    /// Number of multicast servers the test needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast_server_count: Option<u32>,

    /// Requires the voice setup (SIP server and softphone).
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub voice: bool,

    /// Provisioning mode, `dual` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_mode: Option<ProvisioningMode>,

    /// Whether LAN clients lease IPv4 over DHCP, `true` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lan_dhcpv4: Option<bool>,
}

impl EnvironmentRequirement {
    /// Creates an empty requirement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `servers` DNS descriptors.
    #[must_use]
    pub fn with_dns(mut self, servers: Vec<DnsServerRequirement>) -> Self {
        self.dns = Some(servers);
        self
    }

    /// Requires the firmware to report `version`.
    #[must_use]
    pub fn with_cwmp_version(mut self, version: impl Into<String>) -> Self {
        self.cwmp_version = Some(version.into());
        self
    }

    /// Requires TR-069 management.
    #[must_use]
    pub fn with_tr069(mut self, tr069: Tr069Requirement) -> Self {
        self.tr069 = Some(tr069);
        self
    }

    /// Requires `count` multicast servers.
    #[must_use]
    pub fn with_multicast_server_count(mut self, count: u32) -> Self {
        self.multicast_server_count = Some(count);
        self
    }

    /// Requires the voice setup.
    #[must_use]
    pub fn with_voice(mut self) -> Self {
        self.voice = true;
        self
    }

    /// Sets the provisioning mode.
    #[must_use]
    pub fn with_provisioning_mode(mut self, mode: ProvisioningMode) -> Self {
        self.provisioning_mode = Some(mode);
        self
    }

    /// Sets whether LAN clients lease IPv4 over DHCP.
    #[must_use]
    pub fn with_lan_dhcpv4(mut self, enabled: bool) -> Self {
        self.lan_dhcpv4 = Some(enabled);
        self
    }

    /// Returns true if at least one DNS descriptor is present.
    #[must_use]
    pub fn requires_dns(&self) -> bool {
        self.dns.as_ref().is_some_and(|servers| !servers.is_empty())
    }

    /// Returns true if a non-empty CWMP version is present.
    #[must_use]
    pub fn requires_cwmp(&self) -> bool {
        self.cwmp_version.as_ref().is_some_and(|version| !version.is_empty())
    }

    /// Returns true if TR-069 management is required.
    #[must_use]
    pub fn requires_tr069(&self) -> bool {
        self.tr069.is_some()
    }

    /// Returns true if a multicast server count is present, even zero.
    #[must_use]
    pub fn requires_multicast(&self) -> bool {
        self.multicast_server_count.is_some()
    }

    /// Returns the provisioning mode, `dual` when absent.
    #[must_use]
    pub fn provisioning_mode(&self) -> ProvisioningMode {
        self.provisioning_mode.unwrap_or_default()
    }

    /// Returns whether LAN clients lease IPv4, `true` when absent.
    #[must_use]
    pub fn lan_dhcpv4(&self) -> bool {
        self.lan_dhcpv4.unwrap_or(true)
    }

    /// Returns the address families LAN clients must lease, in lease order.
    #[must_use]
    pub fn lan_families(&self) -> Vec<AddressFamily> {
        let mut families = Vec::with_capacity(2);
        if self.lan_dhcpv4() {
            families.push(AddressFamily::Ipv4);
        }
        if self.provisioning_mode().leases_ipv6() {
            families.push(AddressFamily::Ipv6);
        }
        families
    }

    /// Returns the reachability expectations for the ACS server name.
    #[must_use]
    pub fn acs_dns(&self) -> Option<&DnsReachability> {
        self.dns
            .as_deref()?
            .iter()
            .find_map(|server| server.acs_server.as_ref())
    }
}
