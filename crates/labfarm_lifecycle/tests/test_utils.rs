//! Shared test utilities for `labfarm_lifecycle` integration tests.
//!
//! Provides a fake device type, a plugin that records every phase it is
//! dispatched for, and registrars with scripted answers.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use labfarm_devices::prelude::*;
use labfarm_hooks::{HookRegistry, Priority};
use labfarm_lifecycle::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared event log.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ═══════════════════════════════════════════════════════════════════════════════
// FAKE DEVICE
// ═══════════════════════════════════════════════════════════════════════════════

pub struct FakeDevice {
    pub name: String,
    pub closed: AtomicBool,
}

impl FakeDevice {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Device for FakeDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, command: &str) -> Result<String, DeviceError> {
        Ok(command.to_string())
    }

    fn close(&self) -> Result<(), DeviceError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Provides the `fake` device type and remembers every device it spawned.
pub struct FakeCatalog {
    pub log: EventLog,
    pub spawned: Arc<Mutex<Vec<Arc<FakeDevice>>>>,
}

impl DeviceCatalog for FakeCatalog {
    fn known_devices(&self) -> KnownDevices {
        self.log.lock().unwrap().push("add_devices".to_string());
        let spawned = Arc::clone(&self.spawned);
        let mut known = KnownDevices::new();
        known
            .register("fake", move |spec: &DeviceSpec| {
                let device = Arc::new(FakeDevice {
                    name: spec.name.clone(),
                    closed: AtomicBool::new(false),
                });
                spawned.lock().unwrap().push(Arc::clone(&device));
                let handle: DeviceHandle = device;
                Ok(handle)
            })
            .unwrap();
        known
    }
}

/// Testbed with a WAN server and a board, both of the `fake` type.
pub fn bench_config() -> TestbedConfig {
    TestbedConfig::new("bench")
        .with_device(DeviceSpec::new("wan", "fake"))
        .with_device(DeviceSpec::new("board", "fake"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING PLUGIN
// ═══════════════════════════════════════════════════════════════════════════════

fn recorder<H: PhaseHook>(log: &EventLog, fail_in: Option<LifecyclePhase>) -> Arc<dyn PhaseHandler> {
    let log = Arc::clone(log);
    Arc::new(move |ctx: &PhaseContext<'_>| -> Result<(), BoxError> {
        log.lock().unwrap().push(H::PHASE.as_str().to_string());
        assert!(!ctx.devices.is_empty());
        if fail_in == Some(H::PHASE) {
            return Err(format!("{} exploded", H::PHASE).into());
        }
        Ok(())
    })
}

/// Registers the `fake` device type, inventory registration and a
/// recorder for every phase hook.
pub struct BenchPlugin {
    pub log: EventLog,
    pub spawned: Arc<Mutex<Vec<Arc<FakeDevice>>>>,
    pub fail_in: Option<LifecyclePhase>,
}

impl BenchPlugin {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: Arc::clone(log),
            spawned: Arc::new(Mutex::new(Vec::new())),
            fail_in: None,
        }
    }

    pub fn failing_in(mut self, phase: LifecyclePhase) -> Self {
        self.fail_in = Some(phase);
        self
    }

    pub fn spawned(&self) -> Arc<Mutex<Vec<Arc<FakeDevice>>>> {
        Arc::clone(&self.spawned)
    }
}

impl Plugin for BenchPlugin {
    fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
        hooks
            .register::<AddDevices>(
                "bench",
                Priority::Normal,
                Arc::new(FakeCatalog {
                    log: Arc::clone(&self.log),
                    spawned: Arc::clone(&self.spawned),
                }),
            )?
            .register::<RegisterDevices>("inventory", Priority::Normal, Arc::new(InventoryRegistrar))?
            .register::<ValidateDeviceRequirements>(
                "bench",
                Priority::Normal,
                recorder::<ValidateDeviceRequirements>(&self.log, self.fail_in),
            )?
            .register::<ServerBoot>("bench", Priority::Normal, recorder::<ServerBoot>(&self.log, self.fail_in))?
            .register::<ServerConfigure>(
                "bench",
                Priority::Normal,
                recorder::<ServerConfigure>(&self.log, self.fail_in),
            )?
            .register::<DeviceBoot>("bench", Priority::Normal, recorder::<DeviceBoot>(&self.log, self.fail_in))?
            .register::<DeviceConfigure>(
                "bench",
                Priority::Normal,
                recorder::<DeviceConfigure>(&self.log, self.fail_in),
            )?
            .register::<AttachedDeviceBoot>(
                "bench",
                Priority::Normal,
                recorder::<AttachedDeviceBoot>(&self.log, self.fail_in),
            )?
            .register::<AttachedDeviceConfigure>(
                "bench",
                Priority::Normal,
                recorder::<AttachedDeviceConfigure>(&self.log, self.fail_in),
            )?
            .register::<ShutdownDevice>(
                "bench",
                Priority::Normal,
                recorder::<ShutdownDevice>(&self.log, self.fail_in),
            )?;
        Ok(())
    }

    fn cleanup(&self, _hooks: &HookRegistry) {
        self.log.lock().unwrap().push("cleanup:bench".to_string());
    }
}

/// Second plugin type, to observe cleanup order.
pub struct NamedPlugin {
    pub label: &'static str,
    pub log: EventLog,
}

impl Plugin for NamedPlugin {
    fn build(&self, _hooks: &HookRegistry) -> Result<(), LifecycleError> {
        self.log.lock().unwrap().push(format!("build:{}", self.label));
        Ok(())
    }

    fn ready(&self, config: &TestbedConfig) -> Result<(), LifecycleError> {
        self.log.lock().unwrap().push(format!("ready:{}:{}", self.label, config.name));
        Ok(())
    }

    fn cleanup(&self, _hooks: &HookRegistry) {
        self.log.lock().unwrap().push(format!("cleanup:{}", self.label));
    }

    fn name(&self) -> &str {
        self.label
    }

    fn is_unique(&self) -> bool {
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCRIPTED REGISTRAR
// ═══════════════════════════════════════════════════════════════════════════════

/// Registrar that logs its label, then either defers or registers a
/// single WAN device named after it.
pub struct ScriptedRegistrar {
    pub label: &'static str,
    pub log: EventLog,
    pub defer: bool,
}

impl DeviceRegistrar for ScriptedRegistrar {
    fn register_devices(&self, _ctx: &RegistrationContext<'_>) -> Result<Option<DeviceManager>, BoxError> {
        self.log.lock().unwrap().push(format!("register:{}", self.label));
        if self.defer {
            return Ok(None);
        }
        let mut builder = DeviceManager::builder();
        builder.bind(
            DeviceRole::Wan,
            Arc::new(FakeDevice {
                name: self.label.to_string(),
                closed: AtomicBool::new(false),
            }),
        )?;
        Ok(Some(builder.build()))
    }
}

/// Plugin registering a list of scripted registrars, in order.
pub struct RegistrarPlugin {
    pub registrars: Vec<(&'static str, bool)>,
    pub log: EventLog,
}

impl Plugin for RegistrarPlugin {
    fn build(&self, hooks: &HookRegistry) -> Result<(), LifecycleError> {
        for (label, defer) in &self.registrars {
            hooks.register::<RegisterDevices>(
                *label,
                Priority::Normal,
                Arc::new(ScriptedRegistrar {
                    label: *label,
                    log: Arc::clone(&self.log),
                    defer: *defer,
                }),
            )?;
        }
        Ok(())
    }
}
