//! Tracing and observability plugin.
//!
//! Provides [`TracingPlugin`] which installs the `tracing` subscriber for a
//! session.
//!
//! # Lifecycle
//!
//! - **`build()`** registers nothing; the subscriber is not installed yet so
//!   that configuration can still change before deployment.
//! - **`ready()`** installs the subscriber. If one is already installed
//!   (another session in the same process, a test harness), the existing one
//!   is kept.
//!
//! # Example
//!
//! ```
//! use labfarm_core_plugins::{TracingFormat, TracingPlugin};
//! use labfarm_lifecycle::{Orchestrator, RunOptions, TestbedConfig};
//! use tracing::Level;
//!
//! let mut session = Orchestrator::new(TestbedConfig::new("bench"), RunOptions::new());
//! session
//!     .add_plugin(
//!         TracingPlugin::default()
//!             .with_level(Level::DEBUG)
//!             .with_format(TracingFormat::Compact),
//!     )
//!     .unwrap();
//! ```

use labfarm_hooks::HookRegistry;
use labfarm_lifecycle::{LifecycleError, Plugin, TestbedConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Effective tracing configuration of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured log level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing and logging plugin.
///
/// Configures the `tracing` subscriber. Uses the [`tracing`] and
/// [`tracing_subscriber`] crates under the hood.
///
/// # Configuration Options
///
/// ```
/// use labfarm_core_plugins::{TracingFormat, TracingPlugin};
/// use tracing::Level;
///
/// // Bench debugging: pretty output with span enter/exit
/// let bench = TracingPlugin::default()
///     .with_level(Level::DEBUG)
///     .with_span_events(true);
///
/// // CI: JSON output, quiet hook registry
/// let ci = TracingPlugin::default()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("labfarm=info,labfarm_hooks=warn");
/// ```
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "labfarm_contingency=debug").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// Creates a new `TracingPlugin` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`. An invalid filter falls back
    /// to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
        }
    }

    fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
            None => EnvFilter::new(self.level.as_str()),
        }
    }
}

impl Plugin for TracingPlugin {
    fn build(&self, _hooks: &HookRegistry) -> Result<(), LifecycleError> {
        Ok(())
    }

    fn ready(&self, config: &TestbedConfig) -> Result<(), LifecycleError> {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init fails when a subscriber is already installed; keep that one.
        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(self.filter())
                .with(tracing_subscriber::fmt::layer().pretty().with_span_events(span_events))
                .try_init()
                .is_ok(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(self.filter())
                .with(tracing_subscriber::fmt::layer().compact().with_span_events(span_events))
                .try_init()
                .is_ok(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(self.filter())
                .with(tracing_subscriber::fmt::layer().json().with_span_events(span_events))
                .try_init()
                .is_ok(),
        };

        tracing::info!(
            testbed = %config.name,
            level = %self.level,
            format = ?self.format,
            installed,
            "TracingPlugin initialized"
        );
        Ok(())
    }

    fn cleanup(&self, _hooks: &HookRegistry) {
        tracing::info!("TracingPlugin shutting down");
    }
}
