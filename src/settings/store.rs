//! The resolved settings store.
//!
//! An explicit value, not a process global: construct once with
//! [`Settings::from_env`], pass by reference to every consumer, mutate only
//! through [`Settings::merge`].

use std::fmt;
use std::sync::Arc;

use crate::coerce::{CoercionError, SettingValue};
use crate::error::ConfigError;
use crate::registry::{Integration, IntegrationRegistry};

/// Options handed to an integration at activation, opaque to this crate.
pub type InstrumentOptions = serde_json::Map<String, serde_json::Value>;

/// The closed set of setting keys. Every key has a default, so the store is
/// always complete, never partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Enabled,
    Ruleset,
    WafTimeout,
    WafDebug,
    TraceRateLimit,
}

impl SettingKey {
    /// Coercion kind this key stores, for mismatch diagnostics.
    pub(crate) fn kind(self) -> &'static str {
        match self {
            SettingKey::Enabled | SettingKey::WafDebug => "boolean",
            SettingKey::Ruleset => "string",
            SettingKey::WafTimeout | SettingKey::TraceRateLimit => "integer",
        }
    }
}

/// One entry of the activation log: which descriptor was requested and the
/// options it was requested with.
#[derive(Clone)]
pub struct ActiveIntegration {
    pub(crate) name: String,
    pub(crate) integration: Arc<dyn Integration>,
    pub(crate) options: InstrumentOptions,
}

impl ActiveIntegration {
    /// Registry name the request was made under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared descriptor handle.
    pub fn integration(&self) -> &Arc<dyn Integration> {
        &self.integration
    }

    /// Options the request carried.
    pub fn options(&self) -> &InstrumentOptions {
        &self.options
    }
}

impl fmt::Debug for ActiveIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveIntegration")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The merged, authoritative settings store.
#[derive(Debug, Clone)]
pub struct Settings {
    pub(crate) enabled: bool,
    pub(crate) ruleset: String,
    pub(crate) waf_timeout: u64,
    pub(crate) waf_debug: bool,
    pub(crate) trace_rate_limit: u64,
    /// Append-only activation log, oldest first. Grows across reentrant
    /// merges; cleared only by [`Settings::reset`].
    pub(crate) active: Vec<ActiveIntegration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            ruleset: "recommended".to_string(),
            waf_timeout: 5_000,
            waf_debug: false,
            trace_rate_limit: 100,
            active: Vec::new(),
        }
    }
}

impl Settings {
    /// Whether AppSec is globally enabled. Nothing is instrumented while
    /// this is false.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Name of the WAF ruleset in force.
    pub fn ruleset(&self) -> &str {
        &self.ruleset
    }

    /// Per-call WAF timeout, in microseconds.
    pub fn waf_timeout(&self) -> u64 {
        self.waf_timeout
    }

    /// Whether WAF-internal debug output is requested.
    pub fn waf_debug(&self) -> bool {
        self.waf_debug
    }

    /// Maximum AppSec traces reported per second.
    pub fn trace_rate_limit(&self) -> u64 {
        self.trace_rate_limit
    }

    /// The activation log, oldest first.
    pub fn active_integrations(&self) -> &[ActiveIntegration] {
        &self.active
    }

    /// Currently configured options for a registered integration.
    ///
    /// Unknown names are an error. A known integration that was never part
    /// of a merge yields an empty map; otherwise the options of its most
    /// recent activation record.
    pub fn options_for(
        &self,
        name: &str,
        registry: &IntegrationRegistry,
    ) -> Result<InstrumentOptions, ConfigError> {
        if registry.lookup(name).is_none() {
            return Err(ConfigError::UnknownIntegration(name.to_string()));
        }
        Ok(self
            .active
            .iter()
            .rev()
            .find(|record| record.name == name)
            .map(|record| record.options.clone())
            .unwrap_or_default())
    }

    /// Route a coerced value into its typed field.
    ///
    /// A kind mismatch is unreachable through the shipped binding table;
    /// it is still reported as a coercion failure rather than a panic.
    pub(crate) fn apply(
        &mut self,
        key: SettingKey,
        value: SettingValue,
    ) -> Result<(), CoercionError> {
        match (key, value) {
            (SettingKey::Enabled, SettingValue::Bool(v)) => self.enabled = v,
            (SettingKey::Ruleset, SettingValue::Str(v)) => self.ruleset = v,
            (SettingKey::WafTimeout, SettingValue::Int(v)) => self.waf_timeout = v,
            (SettingKey::WafDebug, SettingValue::Bool(v)) => self.waf_debug = v,
            (SettingKey::TraceRateLimit, SettingValue::Int(v)) => self.trace_rate_limit = v,
            (key, value) => {
                return Err(CoercionError {
                    expected: key.kind(),
                    raw: format!("{value:?}"),
                });
            }
        }
        Ok(())
    }

    /// Restore the defaults-plus-environment state and clear the activation
    /// log. For test teardown.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        *self = Settings::from_env()?;
        Ok(())
    }
}
