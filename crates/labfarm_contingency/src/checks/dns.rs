use core::net::IpAddr;

use labfarm_devices::{AcsServer, DeviceRole};

use crate::error::ContingencyError;
use crate::hooks::{Check, CheckContext};
use crate::report::InterfaceReport;
use crate::requirement::{AddressFamily, ProvisioningMode, ReachabilityCounts};

/// Name the device under test resolves to find the ACS.
pub const ACS_DOMAIN: &str = "acs_server.boardfarm.com";

/// Resolves [`ACS_DOMAIN`] on the device under test and pings every address
/// it resolves to. The observed counts must equal the requirement's counts
/// for the active provisioning mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsCheck;

/// Addresses of the ACS interfaces facing the device under test.
fn acs_addresses(acs: &dyn AcsServer, family: AddressFamily) -> Result<Vec<IpAddr>, ContingencyError> {
    let mut addresses = Vec::with_capacity(2);
    for iface in core::iter::once(acs.dut_iface()).chain(acs.aux_dut_iface()) {
        let address = match family {
            AddressFamily::Ipv4 => acs.ipv4_addr(iface)?.map(IpAddr::V4),
            AddressFamily::Ipv6 => acs.ipv6_addr(iface)?.map(IpAddr::V6),
        };
        addresses.extend(address);
    }
    Ok(addresses)
}

impl Check for DnsCheck {
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        tracing::info!("executing DNS service check");

        let Some(expected) = ctx.requirement.acs_dns() else {
            tracing::info!("no ACS_SERVER expectations, DNS service check executed");
            return Ok(None);
        };

        let cpe = ctx.devices.cpe(DeviceRole::Dut)?;
        let acs = ctx.devices.acs_server(DeviceRole::AcsServer)?;
        let mode = ctx.requirement.provisioning_mode();
        let ipv4 = expected.counts(AddressFamily::Ipv4);
        let ipv6 = expected.counts(AddressFamily::Ipv6);

        let mut resolved = cpe.nslookup(ACS_DOMAIN)?;

        // The ACS still publishes both families; drop the ones the DUT cannot use.
        let excluded = if ipv6.reachable > 0 && mode == ProvisioningMode::Ipv4 {
            acs_addresses(acs, AddressFamily::Ipv6)?
        } else if ipv4.reachable > 0 && mode == ProvisioningMode::Ipv6 {
            acs_addresses(acs, AddressFamily::Ipv4)?
        } else {
            Vec::new()
        };
        resolved.retain(|address| !excluded.contains(address));

        let required = match mode {
            ProvisioningMode::Ipv4 => ipv4,
            ProvisioningMode::Ipv6 => ipv6,
            ProvisioningMode::Dual => ipv4 + ipv6,
            ProvisioningMode::None => ReachabilityCounts::default(),
        };

        let mut observed = ReachabilityCounts::default();
        for address in &resolved {
            if cpe.ping(*address)? {
                observed.reachable += 1;
            } else {
                observed.unreachable += 1;
            }
        }

        tracing::debug!(%mode, ?required, ?observed, resolved = resolved.len(), "ACS name reachability");

        if observed != required {
            return Err(ContingencyError::hard_failure(
                "DNS check for ipv4/ipv6 reachability failed",
            ));
        }

        tracing::info!("DNS service check executed");
        Ok(None)
    }
}
