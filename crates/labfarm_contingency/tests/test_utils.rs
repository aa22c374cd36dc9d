//! Shared test utilities for `labfarm_contingency` integration tests.
//!
//! Provides fake devices with scriptable behaviour, a testbed builder and a
//! check catalog that records execution order. Import via `mod test_utils;`.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use core::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use core::time::Duration;
use labfarm_contingency::prelude::*;
use labfarm_devices::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// ═══════════════════════════════════════════════════════════════════════════════
// FAKE DEVICES
// ═══════════════════════════════════════════════════════════════════════════════

/// WAN-side Linux server. Acts as WAN gateway.
pub struct FakeServer {
    pub name: String,
    pub responsive: bool,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl FakeServer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responsive: true,
            ipv4: Some(Ipv4Addr::new(172, 25, 1, 1)),
            ipv6: Some(Ipv6Addr::new(0x2001, 0xdead, 0xbeef, 0, 0, 0, 0, 1)),
        }
    }

    pub fn unresponsive(mut self) -> Self {
        self.responsive = false;
        self
    }
}

impl Device for FakeServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        if !self.responsive {
            return Err(DeviceError::command(&self.name, "timeout waiting for prompt"));
        }
        Ok(command.trim_start_matches("echo ").trim_matches('"').to_string())
    }

    fn as_wan_gateway(&self) -> Option<&dyn WanGateway> {
        Some(self)
    }
}

impl InterfaceAddresses for FakeServer {
    fn dut_iface(&self) -> &str {
        "eth1"
    }

    fn ipv4_addr(&self, _iface: &str) -> Result<Option<Ipv4Addr>, DeviceError> {
        Ok(self.ipv4)
    }

    fn ipv6_addr(&self, _iface: &str) -> Result<Option<Ipv6Addr>, DeviceError> {
        Ok(self.ipv6)
    }
}

impl WanGateway for FakeServer {}

/// LAN client container.
pub struct FakeLan {
    pub name: String,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
    /// `(family, prep_iface)` of every lease request.
    pub leases: Mutex<Vec<(&'static str, bool)>>,
}

impl FakeLan {
    pub fn new(name: &str, host: u8) -> Self {
        Self {
            name: name.to_string(),
            ipv4: Some(Ipv4Addr::new(192, 168, 178, host)),
            ipv6: Some(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, u16::from(host))),
            leases: Mutex::new(Vec::new()),
        }
    }

    pub fn without_ipv6(mut self) -> Self {
        self.ipv6 = None;
        self
    }

    pub fn lease_log(&self) -> Vec<(&'static str, bool)> {
        self.leases.lock().unwrap().clone()
    }
}

impl Device for FakeLan {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        Ok(command.to_string())
    }

    fn as_lan_client(&self) -> Option<&dyn LanClient> {
        Some(self)
    }
}

impl LanClient for FakeLan {
    fn configure_docker_iface(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn start_ipv4_lan_client(&self, prep_iface: bool) -> Result<Option<Ipv4Addr>, DeviceError> {
        self.leases.lock().unwrap().push(("ipv4", prep_iface));
        Ok(self.ipv4)
    }

    fn start_ipv6_lan_client(&self, prep_iface: bool) -> Result<Option<Ipv6Addr>, DeviceError> {
        self.leases.lock().unwrap().push(("ipv6", prep_iface));
        Ok(self.ipv6)
    }
}

/// The device under test.
pub struct FakeCpe {
    pub cwmp_version: String,
    pub resolved: Vec<IpAddr>,
    pub reachable: Vec<IpAddr>,
}

impl FakeCpe {
    pub fn new() -> Self {
        Self {
            cwmp_version: "1.4".to_string(),
            resolved: Vec::new(),
            reachable: Vec::new(),
        }
    }

    /// Resolves the ACS name to `addresses`, all of which answer pings.
    pub fn resolving(mut self, addresses: &[IpAddr]) -> Self {
        self.resolved = addresses.to_vec();
        self.reachable = addresses.to_vec();
        self
    }

    /// Makes every resolved address silent.
    pub fn unreachable(mut self) -> Self {
        self.reachable.clear();
        self
    }

    pub fn with_cwmp_version(mut self, version: &str) -> Self {
        self.cwmp_version = version.to_string();
        self
    }
}

impl Device for FakeCpe {
    fn name(&self) -> &str {
        "board"
    }

    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        Ok(command.to_string())
    }

    fn as_cpe(&self) -> Option<&dyn Cpe> {
        Some(self)
    }
}

impl Cpe for FakeCpe {
    fn cpe_id(&self) -> Result<String, DeviceError> {
        Ok("DEAD-BEEF-0001".to_string())
    }

    fn cwmp_version(&self) -> Result<String, DeviceError> {
        Ok(self.cwmp_version.clone())
    }

    fn nslookup(&self, _domain: &str) -> Result<Vec<IpAddr>, DeviceError> {
        Ok(self.resolved.clone())
    }

    fn ping(&self, address: IpAddr) -> Result<bool, DeviceError> {
        Ok(self.reachable.contains(&address))
    }
}

/// TR-069 ACS whose parameter reads fail a scripted number of times.
///
/// A stalling ACS answers after `stall` regardless of the timeout it was
/// given; a timing-out one reports a timeout on every read.
pub struct FakeAcs {
    pub failures_before_success: u32,
    pub stall: Duration,
    pub times_out: bool,
    pub timeouts: Mutex<Vec<Duration>>,
    pub calls: AtomicU32,
    pub session_connected: bool,
    pub ipv4: Ipv4Addr,
    pub ipv6: Ipv6Addr,
}

impl FakeAcs {
    pub fn new() -> Self {
        Self {
            failures_before_success: 0,
            stall: Duration::ZERO,
            times_out: false,
            timeouts: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            session_connected: true,
            ipv4: Ipv4Addr::new(172, 25, 1, 40),
            ipv6: Ipv6Addr::new(0x2001, 0xdead, 0xbeef, 0, 0, 0, 0, 0x40),
        }
    }

    pub fn failing(mut self, times: u32) -> Self {
        self.failures_before_success = times;
        self
    }

    pub fn stalling(mut self, stall: Duration) -> Self {
        self.stall = stall;
        self
    }

    pub fn timing_out(mut self) -> Self {
        self.times_out = true;
        self
    }

    /// Timeouts handed to each parameter read, in call order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }

    pub fn without_capture(mut self) -> Self {
        self.session_connected = false;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Device for FakeAcs {
    fn name(&self) -> &str {
        "acs_server"
    }

    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        Ok(command.to_string())
    }

    fn as_acs_server(&self) -> Option<&dyn AcsServer> {
        Some(self)
    }
}

impl InterfaceAddresses for FakeAcs {
    fn dut_iface(&self) -> &str {
        "eth1"
    }

    fn ipv4_addr(&self, _iface: &str) -> Result<Option<Ipv4Addr>, DeviceError> {
        Ok(Some(self.ipv4))
    }

    fn ipv6_addr(&self, _iface: &str) -> Result<Option<Ipv6Addr>, DeviceError> {
        Ok(Some(self.ipv6))
    }
}

impl AcsServer for FakeAcs {
    fn get_parameter_value(&self, parameter: &str, timeout: Duration) -> Result<String, DeviceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.timeouts.lock().unwrap().push(timeout);
        if self.times_out {
            return Err(DeviceError::timeout("acs_server", parameter, timeout));
        }
        if !self.stall.is_zero() {
            std::thread::sleep(self.stall);
        }
        if call < self.failures_before_success {
            Err(DeviceError::command("acs_server", "device not reachable"))
        } else {
            Ok("7.2.1".to_string())
        }
    }

    fn session_connected(&self) -> bool {
        self.session_connected
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTBED
// ═══════════════════════════════════════════════════════════════════════════════

/// Handles kept by a test to inspect fakes after a run.
pub struct Testbed {
    pub devices: DeviceManager,
    pub lan: Arc<FakeLan>,
    pub lan2: Option<Arc<FakeLan>>,
    pub acs: Arc<FakeAcs>,
}

/// Builds a testbed with every role the built-in checks use.
pub struct TestbedBuilder {
    wan: FakeServer,
    cpe: FakeCpe,
    acs: FakeAcs,
    lan: FakeLan,
    lan2: Option<FakeLan>,
    voice: bool,
}

impl TestbedBuilder {
    pub fn new() -> Self {
        Self {
            wan: FakeServer::new("wan"),
            cpe: FakeCpe::new(),
            acs: FakeAcs::new(),
            lan: FakeLan::new("lan", 10),
            lan2: Some(FakeLan::new("lan2", 11)),
            voice: false,
        }
    }

    pub fn wan(mut self, wan: FakeServer) -> Self {
        self.wan = wan;
        self
    }

    pub fn cpe(mut self, cpe: FakeCpe) -> Self {
        self.cpe = cpe;
        self
    }

    pub fn acs(mut self, acs: FakeAcs) -> Self {
        self.acs = acs;
        self
    }

    pub fn lan(mut self, lan: FakeLan) -> Self {
        self.lan = lan;
        self
    }

    pub fn without_lan2(mut self) -> Self {
        self.lan2 = None;
        self
    }

    pub fn with_voice(mut self) -> Self {
        self.voice = true;
        self
    }

    pub fn build(self) -> Testbed {
        let lan = Arc::new(self.lan);
        let lan2 = self.lan2.map(Arc::new);
        let acs = Arc::new(self.acs);

        let mut builder = DeviceManager::builder();
        builder
            .bind(DeviceRole::Dut, Arc::new(self.cpe))
            .unwrap()
            .bind(DeviceRole::Wan, Arc::new(self.wan))
            .unwrap()
            .bind(DeviceRole::Provisioner, Arc::new(FakeServer::new("provisioner")))
            .unwrap()
            .bind(DeviceRole::AcsServer, acs.clone())
            .unwrap()
            .bind(DeviceRole::Lan, lan.clone())
            .unwrap();
        if let Some(lan2) = &lan2 {
            builder.bind(DeviceRole::Lan2, lan2.clone()).unwrap();
        }
        if self.voice {
            builder
                .bind(DeviceRole::Sipcenter, Arc::new(FakeServer::new("sipcenter")))
                .unwrap()
                .bind(DeviceRole::Softphone, Arc::new(FakeServer::new("softphone")))
                .unwrap();
        }

        Testbed {
            devices: builder.build(),
            lan,
            lan2,
            acs,
        }
    }
}

/// Composer over the built-in checks that never sleeps between retries.
pub fn fast_composer(retries: u32) -> ContingencyComposer {
    ContingencyComposer::with_catalog(
        BuiltinChecks::new().with_acs_retry(RetryPolicy::new(retries, Duration::ZERO)),
    )
}

/// Composer over the built-in checks with an explicit ACS retry budget.
pub fn composer_with(policy: RetryPolicy) -> ContingencyComposer {
    ContingencyComposer::with_catalog(BuiltinChecks::new().with_acs_retry(policy))
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING CATALOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared execution log.
pub type CheckLog = Arc<Mutex<Vec<&'static str>>>;

/// Check that logs its name, then returns a scripted result.
pub struct RecordingCheck {
    descriptor: CheckDescriptor,
    log: CheckLog,
    error: Option<ContingencyError>,
}

impl Check for RecordingCheck {
    fn service_check(&self, _ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        self.log.lock().unwrap().push(self.descriptor.as_str());
        match &self.error {
            Some(error) => Err(error.clone()),
            None if self.descriptor == CheckDescriptor::CheckInterface => {
                let mut report = InterfaceReport::new();
                report.insert(InterfaceReport::WAN, LeasedAddresses::default());
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }
}

/// Catalog of recording checks. Counts how many instances it handed out.
#[derive(Default)]
pub struct RecordingCatalog {
    pub log: CheckLog,
    pub failures: Vec<(CheckDescriptor, ContingencyError)>,
    pub instances: AtomicU32,
}

impl RecordingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, descriptor: CheckDescriptor, error: ContingencyError) -> Self {
        self.failures.push((descriptor, error));
        self
    }

    /// Returns and clears the execution log.
    pub fn take_log(&self) -> Vec<&'static str> {
        core::mem::take(&mut *self.log.lock().unwrap())
    }
}

impl CheckCatalog for RecordingCatalog {
    fn check(&self, descriptor: CheckDescriptor) -> Arc<dyn Check> {
        self.instances.fetch_add(1, Ordering::SeqCst);
        let error = self
            .failures
            .iter()
            .find(|(failing, _)| *failing == descriptor)
            .map(|(_, error)| error.clone());
        Arc::new(RecordingCheck {
            descriptor,
            log: Arc::clone(&self.log),
            error,
        })
    }
}

/// Devices with nothing bound. Recording checks never look anything up.
pub fn no_devices() -> DeviceManager {
    DeviceManager::builder().build()
}
