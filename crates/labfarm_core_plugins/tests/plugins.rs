//! Core plugins driven through a full session.

use std::sync::{Arc, Mutex};

use labfarm_contingency::prelude::*;
use labfarm_core_plugins::{CONTINGENCY_HANDLER, ContingencyPlugin, DefaultPlugins, TracingPlugin};
use labfarm_devices::prelude::*;
use labfarm_hooks::{HookRegistry, Priority};
use labfarm_lifecycle::prelude::*;

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn events(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

struct Inert {
    name: String,
}

impl Device for Inert {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        Ok(command.to_string())
    }
}

struct InertCatalog;

impl DeviceCatalog for InertCatalog {
    fn known_devices(&self) -> KnownDevices {
        let mut known = KnownDevices::new();
        known
            .register("inert", |spec: &DeviceSpec| {
                let handle: DeviceHandle = Arc::new(Inert {
                    name: spec.name.clone(),
                });
                Ok(handle)
            })
            .unwrap();
        known
    }
}

/// Provides the `inert` device type and inventory registration.
struct BenchPlugin;

impl Plugin for BenchPlugin {
    fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
        hooks
            .register::<AddDevices>("bench", Priority::Normal, Arc::new(InertCatalog))?
            .register::<RegisterDevices>("inventory", Priority::Normal, Arc::new(InventoryRegistrar))?;
        Ok(())
    }
}

fn bench_config() -> TestbedConfig {
    TestbedConfig::new("bench")
        .with_device(DeviceSpec::new("wan", "inert"))
        .with_device(DeviceSpec::new("board", "inert"))
}

/// Check that logs its descriptor, optionally failing with `error`.
struct LoggedCheck {
    descriptor: CheckDescriptor,
    log: Log,
    error: Option<ContingencyError>,
}

impl Check for LoggedCheck {
    fn service_check(&self, _ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        self.log.lock().unwrap().push(self.descriptor.as_str().to_string());
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if self.descriptor == CheckDescriptor::CheckInterface {
            let mut report = InterfaceReport::new();
            report.insert("wan", LeasedAddresses::default());
            return Ok(Some(report));
        }
        Ok(None)
    }
}

struct LoggedCatalog {
    log: Log,
    failing: Option<(CheckDescriptor, ContingencyError)>,
}

impl CheckCatalog for LoggedCatalog {
    fn check(&self, descriptor: CheckDescriptor) -> Arc<dyn Check> {
        let error = self
            .failing
            .as_ref()
            .filter(|(failing, _)| *failing == descriptor)
            .map(|(_, error)| error.clone());
        Arc::new(LoggedCheck {
            descriptor,
            log: Arc::clone(&self.log),
            error,
        })
    }
}

/// Contingency handler contributed by another plugin at normal priority.
struct Audit {
    log: Log,
}

impl ContingencyHandler for Audit {
    fn contingency_check(&self, _ctx: &CheckContext<'_>) -> Result<Option<InterfaceReport>, ContingencyError> {
        self.log.lock().unwrap().push("audit".to_string());
        Ok(None)
    }
}

struct AuditPlugin {
    log: Log,
}

impl Plugin for AuditPlugin {
    fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
        hooks.register::<ContingencyCheck>(
            "audit",
            Priority::Normal,
            Arc::new(Audit {
                log: Arc::clone(&self.log),
            }),
        )?;
        Ok(())
    }
}

fn deployed(log: &Log, failing: Option<(CheckDescriptor, ContingencyError)>) -> Orchestrator {
    let mut session = Orchestrator::new(bench_config(), RunOptions::new().with_skip_boot(true));
    // Added before the contingency plugin; priority still puts the composer first.
    session
        .add_plugin(AuditPlugin { log: Arc::clone(log) })
        .unwrap()
        .add_plugin(BenchPlugin)
        .unwrap()
        .add_plugin(ContingencyPlugin::with_catalog(LoggedCatalog {
            log: Arc::clone(log),
            failing,
        }))
        .unwrap();
    session.deploy().unwrap();
    session
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTINGENCY PLUGIN
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn composer_runs_before_other_contingency_handlers() {
    let log = new_log();
    let session = deployed(&log, None);

    assert_eq!(
        session.hooks().implementation_names::<ContingencyCheck>(),
        vec![CONTINGENCY_HANDLER, "audit"]
    );

    let outcome = session
        .contingency_check(&EnvironmentRequirement::new().with_multicast_server_count(1))
        .unwrap();

    assert!(outcome.is_passed());
    assert_eq!(events(&log), vec!["DefaultChecks", "Multicast", "CheckInterface", "audit"]);
    match outcome {
        ContingencyOutcome::Passed(report) => assert!(report.wan().is_some()),
        other => panic!("expected a pass, got {other:?}"),
    }
}

#[test]
fn failing_check_stops_every_later_handler() {
    let log = new_log();
    let session = deployed(
        &log,
        Some((CheckDescriptor::Dns, ContingencyError::hard_failure("DNS check failed"))),
    );

    let requirement = EnvironmentRequirement::new().with_dns(vec![DnsServerRequirement::default()]);
    let outcome = session.contingency_check(&requirement).unwrap();

    assert_eq!(outcome, ContingencyOutcome::Failed("DNS check failed".to_string()));
    assert_eq!(events(&log), vec!["DefaultChecks", "DNS"]);
}

#[test]
fn skip_signal_is_reported_as_skipped() {
    let log = new_log();
    let session = deployed(
        &log,
        Some((CheckDescriptor::Cwmp, ContingencyError::skip("Skipping Test: CWMP version mismatch"))),
    );

    let outcome = session
        .contingency_check(&EnvironmentRequirement::new().with_cwmp_version("1.2"))
        .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(outcome.reason(), Some("Skipping Test: CWMP version mismatch"));
}

#[test]
fn each_check_invocation_starts_from_a_clean_registry() {
    let log = new_log();
    let session = deployed(&log, None);

    session.contingency_check(&EnvironmentRequirement::new()).unwrap();
    session.contingency_check(&EnvironmentRequirement::new()).unwrap();

    assert_eq!(
        events(&log),
        vec!["DefaultChecks", "CheckInterface", "audit", "DefaultChecks", "CheckInterface", "audit"]
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUNDLE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn default_plugins_add_tracing_and_contingency() {
    let mut session = Orchestrator::new(bench_config(), RunOptions::new());
    DefaultPlugins.add_to(&mut session).unwrap();

    assert!(session.has_plugin::<TracingPlugin>());
    assert!(session.has_plugin::<ContingencyPlugin>());
    assert!(matches!(
        DefaultPlugins.add_to(&mut session),
        Err(LifecycleError::DuplicatePlugin(_))
    ));
}

#[test]
fn tracing_plugin_survives_a_full_session() {
    let mut session = Orchestrator::new(bench_config(), RunOptions::new());
    session
        .add_plugin(TracingPlugin::new())
        .unwrap()
        .add_plugin(BenchPlugin)
        .unwrap();

    session.deploy().unwrap();
    session.shutdown().unwrap();
}
