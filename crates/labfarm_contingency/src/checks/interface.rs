use labfarm_devices::DeviceRole;

use crate::error::ContingencyError;
use crate::hooks::{Check, CheckContext};
use crate::report::{InterfaceReport, LeasedAddresses};
use crate::requirement::AddressFamily;

/// Brings up every LAN client, leases the address families the requirement
/// asks for, and records the WAN gateway addresses.
///
/// Its report is the payload of a successful run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckInterface;

impl Check for CheckInterface {
    fn service_check(&self, ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        tracing::info!("executing CheckInterface service check");

        let devices = ctx.devices;
        let wan = devices.wan_gateway(DeviceRole::Wan)?;
        let families = ctx.requirement.lan_families();
        let mut report = InterfaceReport::new();

        for role in [DeviceRole::Lan, DeviceRole::Lan2] {
            let Some(device) = devices.get(role) else {
                continue;
            };
            let lan = devices.lan_client(role)?;
            lan.configure_docker_iface()?;

            let mut leased = LeasedAddresses::default();
            // The DUT side of the interface is restarted once, before the first lease.
            let mut prep_iface = true;
            for family in &families {
                let acquired = match family {
                    AddressFamily::Ipv4 => lan
                        .start_ipv4_lan_client(prep_iface)?
                        .map(|address| leased.ipv4 = Some(address)),
                    AddressFamily::Ipv6 => lan
                        .start_ipv6_lan_client(prep_iface)?
                        .map(|address| leased.ipv6 = Some(address)),
                };
                if acquired.is_none() {
                    return Err(ContingencyError::hard_failure(format!(
                        "{} failed to get {family} address!!",
                        device.name()
                    )));
                }
                prep_iface = false;
            }

            tracing::debug!(device = device.name(), ?leased, "LAN client leased addresses");
            report.insert(device.name(), leased);
            lan.configure_proxy_pkgs()?;
        }

        let iface = wan.dut_iface();
        report.insert(
            InterfaceReport::WAN,
            LeasedAddresses {
                ipv4: wan.ipv4_addr(iface)?,
                ipv6: wan.ipv6_addr(iface)?,
            },
        );

        tracing::info!(entries = report.len(), "CheckInterface service check executed");
        Ok(Some(report))
    }
}
