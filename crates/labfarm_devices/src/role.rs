//! Device roles and device arrays.
//!
//! A [`DeviceRole`] names the single device playing a part in the testbed
//! (the device under test, the WAN container, the first LAN client, ...).
//! A [`DeviceArray`] names an ordered group of interchangeable devices, such
//! as every LAN client, addressed with inventory expressions like
//! `lan_clients[1]`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

// ─────────────────────────────────────────────────────────────────────────────
// DeviceRole
// ─────────────────────────────────────────────────────────────────────────────

/// Part a device plays in the testbed.
///
/// The string form matches inventory names. `board` is accepted as an alias
/// of `DUT`, and `lan1` as an alias of `lan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceRole {
    /// The device under test.
    #[serde(rename = "DUT", alias = "board")]
    Dut,
    /// Primary WAN-side server.
    #[serde(rename = "wan")]
    Wan,
    /// Secondary WAN-side server.
    #[serde(rename = "wan2")]
    Wan2,
    /// First LAN client.
    #[serde(rename = "lan", alias = "lan1")]
    Lan,
    /// Second LAN client.
    #[serde(rename = "lan2")]
    Lan2,
    /// DHCP/TFTP provisioning server.
    #[serde(rename = "provisioner")]
    Provisioner,
    /// SIP server.
    #[serde(rename = "sipcenter")]
    Sipcenter,
    /// Software SIP phone.
    #[serde(rename = "softphone")]
    Softphone,
    /// TR-069 auto-configuration server.
    #[serde(rename = "acs_server")]
    AcsServer,
    /// Wireless LAN client.
    #[serde(rename = "wlan")]
    Wlan,
    /// Cable modem termination system.
    #[serde(rename = "cmts")]
    Cmts,
    /// Standalone DNS server.
    #[serde(rename = "dns_server")]
    DnsServer,
}

impl DeviceRole {
    /// Every role, in declaration order.
    pub const ALL: [DeviceRole; 12] = [
        DeviceRole::Dut,
        DeviceRole::Wan,
        DeviceRole::Wan2,
        DeviceRole::Lan,
        DeviceRole::Lan2,
        DeviceRole::Provisioner,
        DeviceRole::Sipcenter,
        DeviceRole::Softphone,
        DeviceRole::AcsServer,
        DeviceRole::Wlan,
        DeviceRole::Cmts,
        DeviceRole::DnsServer,
    ];

    /// Returns the canonical inventory name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceRole::Dut => "DUT",
            DeviceRole::Wan => "wan",
            DeviceRole::Wan2 => "wan2",
            DeviceRole::Lan => "lan",
            DeviceRole::Lan2 => "lan2",
            DeviceRole::Provisioner => "provisioner",
            DeviceRole::Sipcenter => "sipcenter",
            DeviceRole::Softphone => "softphone",
            DeviceRole::AcsServer => "acs_server",
            DeviceRole::Wlan => "wlan",
            DeviceRole::Cmts => "cmts",
            DeviceRole::DnsServer => "dns_server",
        }
    }

    /// Returns true for roles on the LAN side of the device under test.
    #[must_use]
    pub fn is_lan_side(&self) -> bool {
        matches!(self, DeviceRole::Lan | DeviceRole::Lan2 | DeviceRole::Wlan)
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceRole {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "board" => Ok(DeviceRole::Dut),
            "lan1" => Ok(DeviceRole::Lan),
            _ => DeviceRole::ALL
                .into_iter()
                .find(|role| role.as_str() == s)
                .ok_or_else(|| DeviceError::UnknownRole(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DeviceArray
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered group of devices of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceArray {
    /// WAN-side clients.
    #[serde(rename = "wan_clients")]
    WanClients,
    /// LAN-side clients.
    #[serde(rename = "lan_clients")]
    LanClients,
    /// Wireless clients.
    #[serde(rename = "wlan_clients")]
    WlanClients,
    /// Analog phone ports.
    #[serde(rename = "FXS")]
    Fxs,
    /// Software phones.
    #[serde(rename = "softphones")]
    Softphones,
    /// Auto-configuration servers.
    #[serde(rename = "acs_servers")]
    AcsServers,
}

impl DeviceArray {
    /// Every array, in declaration order.
    pub const ALL: [DeviceArray; 6] = [
        DeviceArray::WanClients,
        DeviceArray::LanClients,
        DeviceArray::WlanClients,
        DeviceArray::Fxs,
        DeviceArray::Softphones,
        DeviceArray::AcsServers,
    ];

    /// Returns the inventory name of the array.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceArray::WanClients => "wan_clients",
            DeviceArray::LanClients => "lan_clients",
            DeviceArray::WlanClients => "wlan_clients",
            DeviceArray::Fxs => "FXS",
            DeviceArray::Softphones => "softphones",
            DeviceArray::AcsServers => "acs_servers",
        }
    }
}

impl fmt::Display for DeviceArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceArray {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceArray::ALL
            .into_iter()
            .find(|array| array.as_str() == s)
            .ok_or_else(|| DeviceError::UnknownArray(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DeviceSelector
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed inventory expression: either a role name or `array[index]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelector {
    /// A single role, e.g. `lan2`.
    Role(DeviceRole),
    /// A member of a device array, e.g. `lan_clients[0]`.
    Member(DeviceArray, usize),
}

impl FromStr for DeviceSelector {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((array, rest)) = s.split_once('[') else {
            return s.parse().map(DeviceSelector::Role);
        };

        let index = rest
            .strip_suffix(']')
            .and_then(|index| index.trim().parse::<usize>().ok())
            .ok_or_else(|| DeviceError::InvalidExpression(s.to_string()))?;

        Ok(DeviceSelector::Member(array.trim().parse()?, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_aliases_parse() {
        assert_eq!("board".parse::<DeviceRole>().unwrap(), DeviceRole::Dut);
        assert_eq!("DUT".parse::<DeviceRole>().unwrap(), DeviceRole::Dut);
        assert_eq!("lan1".parse::<DeviceRole>().unwrap(), DeviceRole::Lan);
        assert_eq!("acs_server".parse::<DeviceRole>().unwrap(), DeviceRole::AcsServer);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "toaster".parse::<DeviceRole>(),
            Err(DeviceError::UnknownRole("toaster".into()))
        );
    }

    #[test]
    fn role_names_round_trip() {
        for role in DeviceRole::ALL {
            assert_eq!(role.to_string().parse::<DeviceRole>().unwrap(), role);
        }
    }

    #[test]
    fn role_serde_accepts_aliases() {
        let roles: Vec<DeviceRole> = serde_json::from_str(r#"["board", "lan1", "wan"]"#).unwrap();
        assert_eq!(roles, vec![DeviceRole::Dut, DeviceRole::Lan, DeviceRole::Wan]);
        assert_eq!(serde_json::to_string(&DeviceRole::Dut).unwrap(), r#""DUT""#);
    }

    #[test]
    fn selector_parses_roles_and_members() {
        assert_eq!(
            "lan2".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::Role(DeviceRole::Lan2)
        );
        assert_eq!(
            "lan_clients[1]".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::Member(DeviceArray::LanClients, 1)
        );
        assert_eq!(
            "FXS[0]".parse::<DeviceSelector>().unwrap(),
            DeviceSelector::Member(DeviceArray::Fxs, 0)
        );
    }

    #[test]
    fn malformed_selector_is_rejected() {
        assert!(matches!(
            "lan_clients[x]".parse::<DeviceSelector>(),
            Err(DeviceError::InvalidExpression(_))
        ));
        assert!(matches!(
            "lan_clients[1".parse::<DeviceSelector>(),
            Err(DeviceError::InvalidExpression(_))
        ));
        assert!(matches!(
            "phones[0]".parse::<DeviceSelector>(),
            Err(DeviceError::UnknownArray(_))
        ));
    }
}
