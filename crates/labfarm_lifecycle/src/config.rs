//! Session configuration handed to every phase hook.
//!
//! [`TestbedConfig`] is the merged inventory and environment description of
//! one testbed. [`RunOptions`] carries the per-run switches a command line
//! would provide.

use std::path::Path;

use labfarm_devices::DeviceSpec;
use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

// ─────────────────────────────────────────────────────────────────────────────
// TestbedConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Inventory and environment of a testbed.
///
/// # Example
///
/// ```
/// use labfarm_lifecycle::config::TestbedConfig;
///
/// let config = TestbedConfig::from_json(
///     r#"{
///         "name": "bench-7",
///         "devices": [
///             {"name": "wan", "type": "debian_wan", "ipaddr": "10.0.0.1"},
///             {"name": "board", "type": "prplos"}
///         ],
///         "environment": {"board": {"model": "F5685LGE"}}
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.devices.len(), 2);
/// assert_eq!(config.device("wan").unwrap().option_str("ipaddr"), Some("10.0.0.1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestbedConfig {
    /// Testbed name, used in logs.
    pub name: String,

    /// Inventory entries, in deployment order.
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,

    /// Free-form environment definition read by device drivers.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub environment: serde_json::Map<String, serde_json::Value>,
}

impl TestbedConfig {
    /// Creates an empty testbed description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an inventory entry.
    #[must_use]
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.devices.push(device);
        self
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Config`] if the document does not match
    /// the schema.
    pub fn from_json(json: &str) -> Result<Self, LifecycleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Io`] if the file cannot be read, or
    /// [`LifecycleError::Config`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LifecycleError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LifecycleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::debug!(testbed = %config.name, path = %path.display(), devices = config.devices.len(), "testbed config loaded");
        Ok(config)
    }

    /// Returns the inventory entry named `name`.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&DeviceSpec> {
        self.devices.iter().find(|spec| spec.name == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RunOptions
// ─────────────────────────────────────────────────────────────────────────────

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Devices are already running: only registration and validation run.
    #[serde(default)]
    pub skip_boot: bool,

    /// Contingency checks are not run before test bodies.
    #[serde(default)]
    pub skip_contingency: bool,
}

impl RunOptions {
    /// Creates the default options: boot everything, check everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the skip-boot switch.
    #[must_use]
    pub fn with_skip_boot(mut self, skip: bool) -> Self {
        self.skip_boot = skip;
        self
    }

    /// Sets the skip-contingency switch.
    #[must_use]
    pub fn with_skip_contingency(mut self, skip: bool) -> Self {
        self.skip_contingency = skip;
        self
    }
}
